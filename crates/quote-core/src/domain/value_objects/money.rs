//! Money Value Object
//!
//! Immutable monetary value with currency. All quote arithmetic runs on
//! `Decimal`; floats never touch an amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money value object with currency
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Create a new money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create zero money
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Create CLP money
    pub fn clp(amount: Decimal) -> Self {
        Self::new(amount, Currency::CLP)
    }

    /// Get the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Get the currency
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Check if same currency
    pub fn same_currency(&self, other: &Money) -> bool {
        self.currency == other.currency
    }

    /// Add money (must be same currency)
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if !self.same_currency(other) {
            return Err(MoneyError::CurrencyMismatch);
        }
        Ok(Money::new(self.amount + other.amount, self.currency.clone()))
    }

    /// Check if negative
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero(Currency::CLP)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.amount)
    }
}

/// Currency enum
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    CLP,
    USD,
    EUR,
    MXN,
    Other(String),
}

impl Currency {
    pub fn code(&self) -> &str {
        match self {
            Self::CLP => "CLP",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::MXN => "MXN",
            Self::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code.to_uppercase().as_str() {
            "CLP" => Self::CLP,
            "USD" => Self::USD,
            "EUR" => Self::EUR,
            "MXN" => Self::MXN,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::CLP
    }
}

/// Money arithmetic failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    CurrencyMismatch,
}

impl std::error::Error for MoneyError {}

impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrencyMismatch => write!(f, "currency mismatch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn clp_constructor_and_accessors() {
        let money = Money::clp(dec!(119));
        assert_eq!(money.amount(), dec!(119));
        assert_eq!(money.currency(), &Currency::CLP);
    }

    #[test]
    fn add_same_currency() {
        let sum = Money::clp(dec!(100)).add(&Money::clp(dec!(19))).unwrap();
        assert_eq!(sum.amount(), dec!(119));
    }

    #[test]
    fn add_rejects_currency_mismatch() {
        let clp = Money::clp(dec!(100));
        let usd = Money::new(dec!(100), Currency::USD);
        assert_eq!(clp.add(&usd), Err(MoneyError::CurrencyMismatch));
    }

    #[test]
    fn currency_codes_round_trip() {
        assert_eq!(Currency::from_code("clp"), Currency::CLP);
        assert_eq!(Currency::from_code("GBP"), Currency::Other("GBP".into()));
        assert_eq!(Currency::CLP.code(), "CLP");
    }
}
