//! # Term Simulator
//!
//! Re-projects the selected interest-bearing entries onto a chosen term.
//!
//! ## Two Branches
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  simulate(selected, T)                                                  │
//! │                                                                         │
//! │  selected ──► keep MCI only ──► any entry already at T?                 │
//! │                                      │                                  │
//! │                  ┌────── yes ────────┴──────── no ──────┐               │
//! │                  ▼                                      ▼               │
//! │   NATIVE: exactly those entries           RE-PROJECT: every entry       │
//! │   monthly = total / T                     total   = base × (1 + r × T)  │
//! │   (base / T when total is 0)              monthly = total / T           │
//! │                                           term    = T                   │
//! │                                                                         │
//! │  Simple interest only. No compounding, no fees, no refetch.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Inclusion Overrides
//! Each purchase id starts included. An explicit include/exclude choice is
//! kept in an id-keyed map that survives term switches and is only dropped
//! by [`TermSimulator::reset`] (a full reload).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::classify::PaymentGroupEntry;
use crate::error::{CoreError, CoreResult};
use crate::format::{annual_rate_pct, monthly_rate_pct};
use crate::model::{OfferType, PurchaseId, Term};
use crate::{DEFAULT_SIMULATOR_TERM, SIMULATOR_TERMS};

// =============================================================================
// Simulated Entry
// =============================================================================

/// A bucket entry projected onto the simulated term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedEntry {
    #[serde(flatten)]
    pub entry: PaymentGroupEntry,

    /// Whether the entry counts towards the simulation and confirmation.
    pub included: bool,

    pub monthly_payment: f64,
}

impl SimulatedEntry {
    fn native(entry: PaymentGroupEntry) -> Self {
        let monthly_payment = entry.monthly_payment();
        SimulatedEntry {
            entry,
            included: true,
            monthly_payment,
        }
    }

    fn reprojected(mut entry: PaymentGroupEntry, term: Term) -> Self {
        let months = term.as_f64();
        let total = entry.base_amount * (1.0 + entry.rate * months);
        entry.total = total;
        entry.term = term;
        SimulatedEntry {
            entry,
            included: true,
            monthly_payment: total / months,
        }
    }
}

/// Projects `selected` onto `term`. Every returned entry starts included.
///
/// MSI entries never take part.
pub fn simulate(selected: &[PaymentGroupEntry], term: Term) -> Vec<SimulatedEntry> {
    let interest_bearing = selected
        .iter()
        .filter(|e| e.offer_type == OfferType::Mci);

    let native: Vec<&PaymentGroupEntry> = interest_bearing.clone().filter(|e| e.term == term).collect();

    if !native.is_empty() {
        return native
            .into_iter()
            .cloned()
            .map(SimulatedEntry::native)
            .collect();
    }

    interest_bearing
        .cloned()
        .map(|entry| SimulatedEntry::reprojected(entry, term))
        .collect()
}

// =============================================================================
// Simulation Summary
// =============================================================================

/// Live preview shown under the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub count: usize,
    pub total_amount: f64,
    pub monthly_payment: f64,
    pub annual_rate_pct: String,
    pub monthly_rate_pct: String,
}

impl SimulationSummary {
    /// Summary of included entries; zeros and `"0.00"` rates when none are.
    pub fn from_entries(entries: &[SimulatedEntry]) -> Self {
        let included: Vec<&SimulatedEntry> = entries.iter().filter(|e| e.included).collect();
        let rate = included.first().map(|e| e.entry.rate).unwrap_or(0.0);

        SimulationSummary {
            count: included.len(),
            total_amount: included.iter().map(|e| e.entry.total_or_base()).sum(),
            monthly_payment: included.iter().map(|e| e.monthly_payment).sum(),
            annual_rate_pct: annual_rate_pct(rate),
            monthly_rate_pct: monthly_rate_pct(rate),
        }
    }
}

// =============================================================================
// Term Simulator
// =============================================================================

/// Chosen term plus the sticky per-purchase inclusion overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct TermSimulator {
    term: Term,
    overrides: HashMap<PurchaseId, bool>,
}

impl Default for TermSimulator {
    fn default() -> Self {
        TermSimulator {
            term: DEFAULT_SIMULATOR_TERM,
            overrides: HashMap::new(),
        }
    }
}

impl TermSimulator {
    /// Starts at the default 24-month term with no overrides.
    pub fn new() -> Self {
        TermSimulator::default()
    }

    pub fn term(&self) -> Term {
        self.term
    }

    /// Switches the simulated term. Overrides are kept.
    pub fn select_term(&mut self, term: Term) -> CoreResult<()> {
        if !SIMULATOR_TERMS.contains(&term) {
            return Err(CoreError::UnsupportedTerm(term.to_string()));
        }
        debug!(from = %self.term, to = %term, "Simulator term changed");
        self.term = term;
        Ok(())
    }

    /// Inclusion of a purchase id; `true` until overridden.
    pub fn is_included(&self, id: PurchaseId) -> bool {
        self.overrides.get(&id).copied().unwrap_or(true)
    }

    pub fn set_included(&mut self, id: PurchaseId, included: bool) {
        self.overrides.insert(id, included);
    }

    /// Flips the inclusion of a purchase id and returns the new value.
    pub fn toggle_included(&mut self, id: PurchaseId) -> bool {
        let included = !self.is_included(id);
        self.overrides.insert(id, included);
        debug!(id, included, "Simulation inclusion changed");
        included
    }

    /// Back to the default term. Overrides are kept.
    ///
    /// Every visit to the simulator starts here, whatever term the previous
    /// visit ended on.
    pub fn reset_term(&mut self) {
        if self.term != DEFAULT_SIMULATOR_TERM {
            debug!(from = %self.term, "Simulator term reset");
        }
        self.term = DEFAULT_SIMULATOR_TERM;
    }

    /// Back to the default term with every id included.
    pub fn reset(&mut self) {
        self.term = DEFAULT_SIMULATOR_TERM;
        self.overrides.clear();
    }

    /// Projects `selected` onto the current term, applying overrides.
    pub fn simulate(&self, selected: &[PaymentGroupEntry]) -> Vec<SimulatedEntry> {
        let mut entries = simulate(selected, self.term);
        for simulated in entries.iter_mut() {
            simulated.included = self.is_included(simulated.entry.id);
        }
        entries
    }

    /// Included entries at the current term.
    pub fn included(&self, selected: &[PaymentGroupEntry]) -> Vec<SimulatedEntry> {
        self.simulate(selected)
            .into_iter()
            .filter(|e| e.included)
            .collect()
    }

    pub fn summary(&self, selected: &[PaymentGroupEntry]) -> SimulationSummary {
        SimulationSummary::from_entries(&self.simulate(selected))
    }
}
