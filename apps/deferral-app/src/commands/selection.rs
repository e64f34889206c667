//! # Selection Commands
//!
//! The purchase selection page: twelve buckets, their counters and the
//! running total.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  24 MSI (1)   24 MCI (0)   18 MSI (0)   ...   3 MCI (2)                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │ [x] LIVERPOOL INSURGENTES S...   2024-02-01        1,050.00 MXN  │  │
//! │  │ [ ] OXXO                         2024-01-15          300.00 MXN  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │  1 selected · 1,050.00 MXN                        [ Continue ]          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use deferral_core::{BucketCounter, BucketKey, PaymentGroupEntry, PurchaseId, SelectionSnapshot};

use crate::commands::Navigation;
use crate::error::ApiError;
use crate::state::{ConfigState, PaymentsSession, PaymentsState};

/// Everything the selection page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    /// Twelve lists in fixed 24/18/12/9/6/3 × MSI/MCI order.
    pub buckets: Vec<Vec<PaymentGroupEntry>>,
    pub counters: Vec<BucketCounter>,
    pub selection: SelectionSnapshot,
    pub formatted_total: String,
}

impl SelectionView {
    fn build(session: &PaymentsSession, config: &ConfigState) -> Self {
        let buckets = session.tracker().buckets();
        let selection = session.selection_snapshot();
        SelectionView {
            buckets: buckets.flatten(),
            counters: buckets.counters(),
            formatted_total: config.format_amount(selection.total),
            selection,
        }
    }
}

/// Gets the current buckets and selection.
pub fn get_selection(payments: &PaymentsState, config: &ConfigState) -> SelectionView {
    debug!("get_selection command");
    payments.with_session(|s| SelectionView::build(s, config))
}

/// Toggles one entry in one bucket.
///
/// ## Arguments
/// * `key` - Bucket the entry lives in
/// * `id` - Purchase id of the entry
pub fn toggle_entry(
    payments: &PaymentsState,
    config: &ConfigState,
    key: BucketKey,
    id: PurchaseId,
) -> Result<SelectionView, ApiError> {
    debug!(bucket = %key, id, "toggle_entry command");

    payments.with_session_mut(|s| -> Result<SelectionView, ApiError> {
        s.tracker_mut().toggle(key, id)?;
        Ok(SelectionView::build(s, config))
    })
}

/// Clears every selection, keeping the loaded purchases.
pub fn clear_selections(payments: &PaymentsState, config: &ConfigState) -> SelectionView {
    debug!("clear_selections command");

    payments.with_session_mut(|s| {
        s.clear_selections();
        SelectionView::build(s, config)
    })
}

/// Moves on to the simulator. Disabled with an empty selection.
pub fn continue_to_simulator(payments: &PaymentsState) -> Result<Navigation, ApiError> {
    debug!("continue_to_simulator command");

    payments.with_session(|s| s.tracker().ensure_selected())?;
    Ok(Navigation::Simulator)
}
