//! Domain services
//!
//! Stateless calculations that do not belong to a single aggregate method.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Statutory VAT rate applied to every quote.
pub const TAX_RATE: Decimal = dec!(0.19);

/// Computed quote totals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Authoritative totals calculation.
///
/// Totals are recomputed from items at every persistence point; figures
/// carried in a request are never read.
pub struct TotalsService;

impl TotalsService {
    /// Line total for one item.
    pub fn line_total(quantity: u32, unit_price: Decimal) -> Decimal {
        (unit_price * Decimal::from(quantity)).normalize()
    }

    /// Subtotal, tax, and total over a set of line totals.
    ///
    /// `tax = round(subtotal * TAX_RATE)`, half away from zero to 2
    /// decimal places. Amounts are normalized so equal values always
    /// carry equal scale.
    pub fn compute<I>(line_totals: I) -> QuoteTotals
    where
        I: IntoIterator<Item = Decimal>,
    {
        let subtotal: Decimal = line_totals.into_iter().sum::<Decimal>().normalize();
        let tax = (subtotal * TAX_RATE)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .normalize();

        QuoteTotals {
            subtotal,
            tax,
            total: (subtotal + tax).normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_is_quantity_times_unit_price() {
        assert_eq!(TotalsService::line_total(3, dec!(10.50)), dec!(31.50));
        assert_eq!(TotalsService::line_total(1, dec!(0)), dec!(0));
    }

    #[test]
    fn single_item_at_100_yields_19_tax() {
        let totals = TotalsService::compute([dec!(100)]);
        assert_eq!(totals.subtotal, dec!(100));
        assert_eq!(totals.tax, dec!(19));
        assert_eq!(totals.total, dec!(119));
    }

    #[test]
    fn tax_rounds_half_away_from_zero() {
        // 100.03 * 0.19 = 19.0057 -> 19.01
        let totals = TotalsService::compute([dec!(100.03)]);
        assert_eq!(totals.tax, dec!(19.01));
        assert_eq!(totals.total, dec!(119.04));
    }

    #[test]
    fn subtotal_sums_all_lines() {
        let totals = TotalsService::compute([dec!(250), dec!(125.50), dec!(24.50)]);
        assert_eq!(totals.subtotal, dec!(400));
        assert_eq!(totals.tax, dec!(76));
        assert_eq!(totals.total, dec!(476));
    }
}
