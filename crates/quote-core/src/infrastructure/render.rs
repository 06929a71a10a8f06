//! Plain-text document rendering.
//!
//! Layout is a stand-in; the contract is what matters: the artifact is a
//! pure function of the snapshot and the verification URL, so rendering
//! the same revision twice yields identical bytes and the same embedded
//! verification code.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

use crate::application::dto::QuoteSnapshot;
use crate::domain::aggregates::ItemDetail;
use crate::ports::outbound::{DocumentRenderer, RenderError, RenderedDocument};

/// Length of the embedded verification code, in hex characters.
const CODE_LEN: usize = 12;

/// Deterministic plain-text renderer
#[derive(Default)]
pub struct PlainTextRenderer;

impl PlainTextRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Machine-readable code tying the artifact to its verification URL.
    fn verification_code(snapshot: &QuoteSnapshot, verification_url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(snapshot.folio.as_bytes());
        hasher.update(b"|");
        hasher.update(snapshot.version.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(verification_url.as_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..CODE_LEN].to_uppercase()
    }
}

#[async_trait]
impl DocumentRenderer for PlainTextRenderer {
    async fn render(
        &self,
        snapshot: &QuoteSnapshot,
        verification_url: &str,
    ) -> Result<RenderedDocument, RenderError> {
        let code = Self::verification_code(snapshot, verification_url);

        let mut out = String::new();
        let _ = writeln!(out, "QUOTE {} rev {}", snapshot.folio, snapshot.version);
        let _ = writeln!(
            out,
            "Client: {} ({})",
            snapshot.client.legal_name, snapshot.client.tax_id
        );
        let _ = writeln!(out);

        for item in &snapshot.items {
            let _ = writeln!(
                out,
                "{}  {}  x{}  @{}  = {}",
                item.part_number, item.name, item.quantity, item.unit_price, item.line_total
            );
            match &item.detail {
                ItemDetail::Standard => {}
                ItemDetail::Fabrication { material, finish } => {
                    let _ = writeln!(out, "    fabrication: {} / {}", material, finish);
                }
                ItemDetail::Service { hours } => {
                    let _ = writeln!(out, "    service: {} h", hours);
                }
            }
            if let Some(url) = &item.spec_url {
                let _ = writeln!(out, "    spec: {}", url);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Subtotal: {} {}", snapshot.currency, snapshot.subtotal);
        let _ = writeln!(out, "IVA 19%:  {} {}", snapshot.currency, snapshot.tax);
        let _ = writeln!(out, "Total:    {} {}", snapshot.currency, snapshot.total);

        if let Some(terms) = &snapshot.terms {
            let _ = writeln!(out, "Terms: {}", terms);
        }
        let _ = writeln!(out, "Valid for {} days", snapshot.validity_days);
        if let Some(notes) = &snapshot.notes {
            let _ = writeln!(out, "Notes: {}", notes);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Verify at: {}", verification_url);
        let _ = writeln!(out, "Code: {}", code);

        Ok(RenderedDocument {
            bytes: out.into_bytes(),
            content_type: "text/plain; charset=utf-8",
            verification_code: code,
        })
    }
}
