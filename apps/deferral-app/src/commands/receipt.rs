//! # Receipt Commands
//!
//! The receipt reads the confirmation record; leaving it clears the
//! record together with every selection.

use serde::Serialize;
use tracing::{debug, info};

use deferral_core::{CardProfile, ConfirmationRecord};

use crate::commands::{Navigation, Routed};
use crate::state::{ConfigState, PaymentsState, SessionStore};

/// Everything the receipt renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
    pub record: ConfirmationRecord,
    pub card: CardProfile,
    /// Amount payable: monthly payment × term, or the purchase total when
    /// that is larger.
    pub formatted_total: String,
    pub formatted_monthly_payment: String,
    /// Local display form of the confirmation timestamp.
    pub issued_at: String,
}

impl ReceiptView {
    fn build(record: ConfirmationRecord, card: CardProfile, config: &ConfigState) -> Self {
        let payable = record.monthly_payment_total * record.term_months.as_f64();
        let total = payable.max(record.total_amount);

        ReceiptView {
            formatted_total: config.format_amount(total),
            formatted_monthly_payment: config.format_amount(record.monthly_payment_total),
            issued_at: record.timestamp.format("%d/%m/%Y %H:%M").to_string(),
            record,
            card,
        }
    }
}

/// Opens the receipt. Without a confirmation record the session is
/// cleared and the view is sent back to the start page.
pub fn open_receipt(
    payments: &PaymentsState,
    store: &SessionStore,
    config: &ConfigState,
) -> Routed<ReceiptView> {
    debug!("open_receipt command");

    match payments.with_session(|s| s.confirmation().cloned()) {
        Some(record) => Routed::Render(ReceiptView::build(record, store.card_profile(), config)),
        None => {
            info!("Receipt opened without confirmation; redirecting to start");
            payments.with_session_mut(|s| s.clear_selections());
            Routed::Redirect(Navigation::Start)
        }
    }
}

/// Leaves the receipt, clearing the record and every selection.
pub fn leave_receipt(payments: &PaymentsState) -> Navigation {
    debug!("leave_receipt command");
    payments.with_session_mut(|s| s.clear_selections());
    Navigation::Start
}
