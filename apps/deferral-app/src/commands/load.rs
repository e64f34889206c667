//! # Load Commands
//!
//! Fetches the three session documents concurrently.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load_all                                                               │
//! │                                                                         │
//! │   ticket = next_load_ticket()                                           │
//! │                                                                         │
//! │   tokio::join!( purchases , deferred , terms )    order irrelevant      │
//! │                    │            │         │                             │
//! │                    ▼            ▼         ▼                             │
//! │   Ok  ──► replace whole set (only if ticket still current)              │
//! │   Err ──► keep previous set, raise banner                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::FETCH_FAILURE_MESSAGE;
use crate::source::DataSource;
use crate::state::{PaymentsState, UiState};

/// Which documents a load applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub purchases: bool,
    pub history: bool,
    pub terms: bool,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.purchases && self.history && self.terms
    }
}

/// Fetches purchases, history and terms, applying each one that succeeds.
///
/// Results arriving after [`cancel_load`] (or after a newer load started)
/// are dropped without touching the session.
pub async fn load_all(source: &dyn DataSource, payments: &PaymentsState, ui: &UiState) -> LoadReport {
    info!("load_all command");
    let ticket = payments.with_session_mut(|s| s.next_load_ticket());
    ui.start_loading();

    let (purchases, deferred, terms) = tokio::join!(
        source.fetch_purchases(),
        source.fetch_deferred_purchases(),
        source.fetch_terms(),
    );

    // A newer load owns the loading flag now; a cancelled one already
    // cleared it.
    if !payments.with_session(|s| s.is_current_load(ticket)) {
        debug!(ticket, "Discarding results of an abandoned load");
        return LoadReport::default();
    }

    let mut report = LoadReport::default();

    match purchases {
        Ok(list) => {
            payments.with_session_mut(|s| s.replace_purchases(list));
            report.purchases = true;
        }
        Err(err) => {
            warn!(%err, "Purchases fetch failed; keeping previous list");
            ui.raise(FETCH_FAILURE_MESSAGE);
        }
    }

    match deferred {
        Ok(list) => {
            payments.with_session_mut(|s| s.replace_deferred(list));
            report.history = true;
        }
        Err(err) => {
            warn!(%err, "History fetch failed; keeping previous list");
            ui.raise(FETCH_FAILURE_MESSAGE);
        }
    }

    match terms {
        Ok(text) => {
            payments.with_session_mut(|s| s.set_terms(text));
            report.terms = true;
        }
        Err(err) => {
            warn!(%err, "Terms fetch failed");
            ui.raise(FETCH_FAILURE_MESSAGE);
        }
    }

    ui.finish_loading();
    report
}

/// Stops observing an in-flight load (the user navigated away) and
/// drops the loading flag.
pub fn cancel_load(payments: &PaymentsState, ui: &UiState) {
    debug!("cancel_load command");
    payments.with_session_mut(|s| s.abandon_load());
    ui.finish_loading();
}
