//! # Commands Module
//!
//! One function per user action. Views call these and render the result.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (navigation outcomes)
//! ├── load.rs       ◄─── Concurrent fetch of the three documents
//! ├── selection.rs  ◄─── Buckets, toggles, clear
//! ├── simulator.rs  ◄─── Term selection, inclusion toggles
//! ├── confirm.rs    ◄─── Terms acceptance, confirmation
//! ├── receipt.rs    ◄─── Receipt view, leaving it
//! └── history.rs    ◄─── Deferred-purchase history
//! ```
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Start ──continue──► Simulator ──continue──► Confirm ──confirm──►       │
//! │    ▲                    │                                    Receipt    │
//! │    │                    │ no MCI selected                       │       │
//! │    └────── redirect ────┘                                       │       │
//! │    └──────────────────────── leave / no record ─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs the session
//! fn continue_to_simulator(payments: &PaymentsState)
//!
//! // Needs the session plus the card profile
//! fn open_receipt(payments: &PaymentsState, store: &SessionStore, config: &ConfigState)
//! ```

use serde::Serialize;

use deferral_core::PurchaseId;

pub mod confirm;
pub mod history;
pub mod load;
pub mod receipt;
pub mod selection;
pub mod simulator;

/// Where the view should go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "page", content = "id", rename_all = "camelCase")]
pub enum Navigation {
    /// Purchase selection (home)
    Start,
    Simulator,
    Confirm,
    Receipt,
    HistoryDetail(PurchaseId),
}

/// Result of entering a guarded view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "camelCase")]
pub enum Routed<T> {
    /// The view can be shown with this data.
    Render(T),
    /// The view's precondition failed; go here instead.
    Redirect(Navigation),
}

impl<T> Routed<T> {
    pub fn into_view(self) -> Option<T> {
        match self {
            Routed::Render(view) => Some(view),
            Routed::Redirect(_) => None,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Routed::Redirect(_))
    }
}
