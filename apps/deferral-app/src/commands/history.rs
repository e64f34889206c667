//! # History Commands
//!
//! Purchases that were already deferred. Read-only.

use serde::Serialize;
use tracing::debug;

use deferral_core::classify::truncate_title;
use deferral_core::{DeferredPurchase, DetailRow, OfferType, PurchaseId};

use crate::commands::Navigation;
use crate::error::ApiError;
use crate::state::{ConfigState, PaymentsState};

/// One row of the history list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: PurchaseId,
    pub title: String,
    pub modified_date: String,
    pub formatted_amount: String,
    #[serde(rename = "type")]
    pub offer_type: Option<OfferType>,
    pub open: Navigation,
}

impl HistoryItem {
    fn build(deferred: &DeferredPurchase, config: &ConfigState) -> Self {
        HistoryItem {
            id: deferred.id,
            title: truncate_title(&deferred.merchant_name),
            modified_date: deferred.modified_date.clone(),
            formatted_amount: config.format_amount(deferred.display_amount()),
            offer_type: deferred.offers.first().map(|o| o.offer_type),
            open: Navigation::HistoryDetail(deferred.id),
        }
    }
}

/// The history detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDetail {
    pub id: PurchaseId,
    pub merchant_name: String,
    pub modified_date: String,
    pub rows: Vec<DetailRow>,
}

/// Lists deferred purchases in the order the source delivered them.
pub fn list_history(payments: &PaymentsState, config: &ConfigState) -> Vec<HistoryItem> {
    debug!("list_history command");
    payments.with_session(|s| {
        s.deferred()
            .iter()
            .map(|d| HistoryItem::build(d, config))
            .collect()
    })
}

/// Gets one deferred purchase by id.
pub fn history_detail(
    payments: &PaymentsState,
    config: &ConfigState,
    id: PurchaseId,
) -> Result<HistoryDetail, ApiError> {
    debug!(id, "history_detail command");

    payments.with_session(|s| -> Result<HistoryDetail, ApiError> {
        let deferred = s
            .deferred()
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ApiError::not_found("Deferred purchase", id))?;

        Ok(HistoryDetail {
            id: deferred.id,
            merchant_name: deferred.merchant_name.clone(),
            modified_date: deferred.modified_date.clone(),
            rows: deferred.details(&config.currency_code),
        })
    })
}
