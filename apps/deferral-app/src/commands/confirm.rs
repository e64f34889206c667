//! # Confirm Commands
//!
//! Terms acceptance and production of the confirmation record.
//!
//! ## Confirm Button State
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   terms not accepted ──────────────► disabled                           │
//! │   accepted, nothing included ──────► disabled                           │
//! │   accepted, included ──────────────► enabled                            │
//! │   confirmation being produced ─────► disabled                           │
//! │                                                                         │
//! │   confirm() ──► begin ──► summarize ──► finish ──► Navigation::Receipt  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info};

use deferral_core::{summarize, CardProfile, CoreError, SimulationSummary, TermsText};

use crate::commands::{Navigation, Routed};
use crate::error::{ApiError, ErrorCode};
use crate::state::{ConfigState, PaymentsSession, PaymentsState, SessionStore};

/// Everything the confirmation dialog renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmView {
    pub term_months: String,
    pub summary: SimulationSummary,
    pub formatted_total: String,
    pub formatted_monthly_payment: String,
    pub card: CardProfile,
    pub terms_accepted: bool,
    pub can_confirm: bool,
}

impl ConfirmView {
    fn build(session: &PaymentsSession, card: CardProfile, config: &ConfigState) -> Self {
        let summary = session.simulation_summary();
        ConfirmView {
            term_months: session.simulator().term().to_string(),
            formatted_total: config.format_amount(summary.total_amount),
            formatted_monthly_payment: config.format_amount(summary.monthly_payment),
            summary,
            card,
            terms_accepted: session.terms_accepted(),
            can_confirm: session.can_confirm(),
        }
    }
}

/// Opens the confirmation dialog. Redirects to the start page when
/// nothing is included in the simulation.
pub fn get_confirm_view(
    payments: &PaymentsState,
    store: &SessionStore,
    config: &ConfigState,
) -> Routed<ConfirmView> {
    debug!("get_confirm_view command");
    let card = store.card_profile();

    payments.with_session(|s| {
        if s.simulation_summary().count == 0 {
            return Routed::Redirect(Navigation::Start);
        }
        Routed::Render(ConfirmView::build(s, card, config))
    })
}

/// Terms-and-conditions text, when it could be loaded.
pub fn get_terms(payments: &PaymentsState) -> Option<TermsText> {
    debug!("get_terms command");
    payments.with_session(|s| s.terms().cloned())
}

/// Accepts or withdraws acceptance of the terms.
pub fn set_terms_accepted(
    payments: &PaymentsState,
    store: &SessionStore,
    config: &ConfigState,
    accepted: bool,
) -> ConfirmView {
    debug!(accepted, "set_terms_accepted command");
    let card = store.card_profile();

    payments.with_session_mut(|s| {
        s.set_terms_accepted(accepted);
        ConfirmView::build(s, card, config)
    })
}

/// Produces the confirmation record and routes to the receipt.
///
/// ## Errors
/// - `TERMS_NOT_ACCEPTED` - terms not accepted yet
/// - `VALIDATION_ERROR` - a confirmation is already being produced
/// - `EMPTY_SELECTION` - nothing is included in the simulation
pub fn confirm(payments: &PaymentsState) -> Result<Navigation, ApiError> {
    debug!("confirm command");

    let input = payments.with_session_mut(|s| {
        if !s.terms_accepted() {
            return Err(ApiError::new(
                ErrorCode::TermsNotAccepted,
                "Terms and conditions must be accepted",
            ));
        }
        if s.is_confirming() {
            return Err(ApiError::validation("Confirmation already in progress"));
        }
        if !s.can_confirm() {
            return Err(CoreError::EmptySelection.into());
        }
        Ok(s.begin_confirmation())
    })?;

    let record = summarize(&input);

    payments.with_session_mut(|s| -> Result<Navigation, ApiError> {
        let confirmed = record.is_some();
        s.finish_confirmation(record);
        if confirmed {
            info!("Payment deferral confirmed");
            Ok(Navigation::Receipt)
        } else {
            Err(CoreError::EmptySelection.into())
        }
    })
}
