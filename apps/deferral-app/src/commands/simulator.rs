//! # Simulator Commands
//!
//! Term selection and per-purchase inclusion for interest-bearing entries.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   Term:  ( 6 ) ( 9 ) ( 12 ) ( 18 ) [ 24 ]        ◄── starts at 24       │
//! │                                                                         │
//! │   [x] LIVERPOOL          1,192.00 MXN    49.67 MXN / month              │
//! │   [ ] SEARS                860.00 MXN    35.83 MXN / month              │
//! │                                                                         │
//! │   1 payment · 49.67 MXN / month · 9.60% annual       [ Continue ]       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info};

use deferral_core::validation::validate_simulator_term;
use deferral_core::{CoreError, PurchaseId, SimulatedEntry, SimulationSummary, SIMULATOR_TERMS};

use crate::commands::{Navigation, Routed};
use crate::error::ApiError;
use crate::state::{ConfigState, PaymentsSession, PaymentsState};

/// Everything the simulator renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorView {
    /// Current term in months.
    pub term_months: String,
    /// Terms offered for selection, shortest first.
    pub available_terms: Vec<String>,
    pub entries: Vec<SimulatedEntry>,
    pub summary: SimulationSummary,
    pub formatted_monthly_payment: String,
    pub can_continue: bool,
}

impl SimulatorView {
    fn build(session: &PaymentsSession, config: &ConfigState) -> Self {
        let entries = session.simulated();
        let summary = SimulationSummary::from_entries(&entries);
        SimulatorView {
            term_months: session.simulator().term().to_string(),
            available_terms: SIMULATOR_TERMS.iter().map(ToString::to_string).collect(),
            formatted_monthly_payment: config.format_amount(summary.monthly_payment),
            can_continue: summary.count > 0,
            entries,
            summary,
        }
    }
}

/// Opens the simulator on the 24-month term. Redirects to the start page
/// when no interest-bearing entry is selected.
///
/// Inclusion overrides from earlier visits are kept; the term is not.
pub fn enter_simulator(payments: &PaymentsState, config: &ConfigState) -> Routed<SimulatorView> {
    debug!("enter_simulator command");

    payments.with_session_mut(|s| {
        if !s.has_simulatable_selection() {
            info!("No interest-bearing selection; redirecting to start");
            return Routed::Redirect(Navigation::Start);
        }
        s.simulator_mut().reset_term();
        Routed::Render(SimulatorView::build(s, config))
    })
}

/// Switches the simulated term.
///
/// ## Arguments
/// * `term_months` - Term as typed or tapped (`"6"`, `"9"`, `"12"`, `"18"`, `"24"`)
pub fn select_term(
    payments: &PaymentsState,
    config: &ConfigState,
    term_months: &str,
) -> Result<SimulatorView, ApiError> {
    debug!(term_months, "select_term command");
    let term = validate_simulator_term(term_months)?;

    payments.with_session_mut(|s| -> Result<SimulatorView, ApiError> {
        s.simulator_mut().select_term(term)?;
        Ok(SimulatorView::build(s, config))
    })
}

/// Includes or excludes a purchase from the simulation. The choice
/// survives term changes.
pub fn toggle_included(
    payments: &PaymentsState,
    config: &ConfigState,
    id: PurchaseId,
) -> Result<SimulatorView, ApiError> {
    debug!(id, "toggle_included command");

    payments.with_session_mut(|s| {
        if !s.contains_simulated(id) {
            return Err(ApiError::not_found("Simulated payment", id));
        }
        s.simulator_mut().toggle_included(id);
        Ok(SimulatorView::build(s, config))
    })
}

/// Moves on to confirmation. Disabled when nothing is included.
pub fn continue_to_confirm(payments: &PaymentsState) -> Result<Navigation, ApiError> {
    debug!("continue_to_confirm command");

    let included = payments.with_session(|s| s.simulation_summary().count);
    if included == 0 {
        return Err(CoreError::EmptySelection.into());
    }
    Ok(Navigation::Confirm)
}
