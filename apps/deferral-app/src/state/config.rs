//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`DEFERRAL_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use deferral_core::{ClassifyOptions, Money};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Directory holding `purchases.json`, `deferred-purchases.json` and
    /// `terms.json`.
    pub data_dir: PathBuf,

    /// Keep only each purchase's longest offer per type in the buckets.
    pub only_max_term: bool,

    /// Currency code appended to formatted amounts (ISO 4217)
    pub currency_code: String,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Data: platform data directory, `./data` when there is none
    /// - Buckets: every offer
    /// - Currency: MXN
    fn default() -> Self {
        ConfigState {
            data_dir: default_data_dir(),
            only_max_term: false,
            currency_code: "MXN".to_string(),
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `DEFERRAL_DATA_DIR`: Override the data directory
    /// - `DEFERRAL_ONLY_MAX_TERM`: `true` or `1` to keep only the longest offers
    /// - `DEFERRAL_CURRENCY`: Override the currency code
    pub fn from_env() -> Self {
        let mut config = ConfigState::default();

        if let Ok(dir) = std::env::var("DEFERRAL_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(flag) = std::env::var("DEFERRAL_ONLY_MAX_TERM") {
            config.only_max_term = parse_flag(&flag);
        }

        if let Ok(currency) = std::env::var("DEFERRAL_CURRENCY") {
            if !currency.trim().is_empty() {
                config.currency_code = currency.trim().to_string();
            }
        }

        config
    }

    pub fn classify_options(&self) -> ClassifyOptions {
        ClassifyOptions {
            only_max_term: self.only_max_term,
        }
    }

    /// Formats an engine amount for display: `"1,050.00 MXN"`.
    pub fn format_amount(&self, amount: f64) -> String {
        Money::from_amount(amount).with_currency(&self.currency_code)
    }
}

/// Platform-specific data directory.
///
/// - **macOS**: `~/Library/Application Support/com.deferral.deferral`
/// - **Windows**: `%APPDATA%\deferral\deferral\data`
/// - **Linux**: `~/.local/share/deferral`
fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "deferral", "deferral")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
