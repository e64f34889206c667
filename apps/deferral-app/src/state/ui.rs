//! # UI State
//!
//! Loading indicator and the error banner.
//!
//! ```text
//! load_all ──► start_loading ──► fetch × 3 ──► finish_loading
//!                                   │
//!                                   └── any failure ──► raise(banner)
//! ```
//!
//! The banner stays up until dismissed or until the next load starts.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// What the view renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSnapshot {
    pub loading: bool,
    pub error_banner: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    inner: Arc<Mutex<UiSnapshot>>,
}

impl UiState {
    pub fn new() -> Self {
        UiState::default()
    }

    pub fn start_loading(&self) {
        let mut ui = self.inner.lock().expect("UI mutex poisoned");
        ui.loading = true;
        ui.error_banner = None;
    }

    pub fn finish_loading(&self) {
        let mut ui = self.inner.lock().expect("UI mutex poisoned");
        ui.loading = false;
    }

    /// Shows the banner. A banner already up keeps its message.
    pub fn raise(&self, message: impl Into<String>) {
        let message = message.into();
        let mut ui = self.inner.lock().expect("UI mutex poisoned");
        if ui.error_banner.is_none() {
            warn!(%message, "Error banner raised");
            ui.error_banner = Some(message);
        }
    }

    pub fn dismiss(&self) {
        let mut ui = self.inner.lock().expect("UI mutex poisoned");
        ui.error_banner = None;
    }

    pub fn snapshot(&self) -> UiSnapshot {
        self.inner.lock().expect("UI mutex poisoned").clone()
    }
}
