//! # Confirmation Summary
//!
//! Reduces the finalized simulation into the record the receipt shows.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  included entries ──► totals ──► rates (first entry) ──► stamp          │
//! │                                                                         │
//! │  totalAmount          Σ base                                            │
//! │  totalWithInterest    Σ (total, or base when 0)                         │
//! │  monthlyPaymentTotal  Σ (total, or base when 0) / term                  │
//! │  monthly/annual rate  first.rate × 100 / × 1200, two decimals           │
//! │  invoiceNumber        random, nine digits                               │
//! │  timestamp            wall clock, UTC                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rates are not checked for homogeneity: a mixed batch reports the rate
//! of its first entry.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;

use crate::format::{annual_rate_pct, monthly_rate_pct};
use crate::model::{OfferType, Term};
use crate::simulator::SimulatedEntry;
use crate::{INVOICE_MAX, INVOICE_MIN};

/// Write-once result of a confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRecord {
    #[ts(type = "string")]
    pub term_months: Term,

    pub monthly_payment_total: f64,
    pub total_with_interest: f64,
    pub annual_rate_pct: String,
    pub monthly_rate_pct: String,
    pub total_amount: f64,

    #[ts(type = "number")]
    pub invoice_number: u64,

    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    pub selected_entries: Vec<SimulatedEntry>,
    pub entry_count: usize,

    #[serde(rename = "type")]
    pub offer_type: OfferType,
}

impl ConfirmationRecord {
    /// True when the confirmed plan accrues interest.
    pub fn has_interest(&self) -> bool {
        self.monthly_rate_pct
            .parse::<f64>()
            .map(|rate| rate > 0.0)
            .unwrap_or(false)
    }
}

/// Summarizes the included entries, stamping a fresh invoice number and
/// the current time.
///
/// Excluded entries are dropped before anything is summed, so the result
/// is `None` not only for an empty list but also for a non-empty list in
/// which every entry is excluded. A record always describes at least one
/// included entry.
pub fn summarize(entries: &[SimulatedEntry]) -> Option<ConfirmationRecord> {
    summarize_at(entries, generate_invoice_number(), Utc::now())
}

/// [`summarize`] with a caller-provided invoice number and timestamp.
pub fn summarize_at(
    entries: &[SimulatedEntry],
    invoice_number: u64,
    timestamp: DateTime<Utc>,
) -> Option<ConfirmationRecord> {
    let included: Vec<SimulatedEntry> = entries.iter().filter(|e| e.included).cloned().collect();
    let first = included.first()?.entry.clone();

    let total_amount: f64 = included.iter().map(|e| e.entry.base_amount).sum();
    let total_with_interest: f64 = included.iter().map(|e| e.entry.total_or_base()).sum();
    let monthly_payment_total: f64 = included.iter().map(|e| e.entry.monthly_payment()).sum();

    info!(
        invoice_number,
        entries = included.len(),
        term = %first.term,
        "Confirmation summarized"
    );

    Some(ConfirmationRecord {
        term_months: first.term,
        monthly_payment_total,
        total_with_interest,
        annual_rate_pct: annual_rate_pct(first.rate),
        monthly_rate_pct: monthly_rate_pct(first.rate),
        total_amount,
        invoice_number,
        timestamp,
        entry_count: included.len(),
        selected_entries: included,
        offer_type: first.offer_type,
    })
}

/// Random nine-digit invoice number. Collisions are possible.
pub fn generate_invoice_number() -> u64 {
    rand::thread_rng().gen_range(INVOICE_MIN..=INVOICE_MAX)
}
