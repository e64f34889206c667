//! # Session Store
//!
//! Session-scoped key-value storage. The only record kept here is the
//! card profile shown on the confirmation and receipt views.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use deferral_core::CardProfile;

/// Key under which the card profile is stored.
pub const CARD_PROFILE_KEY: &str = "cardInfo";

/// String key-value store living as long as the session.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().expect("Session store mutex poisoned");
        values.get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut values = self.values.lock().expect("Session store mutex poisoned");
        values.insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        let mut values = self.values.lock().expect("Session store mutex poisoned");
        values.remove(key)
    }

    /// Stored card profile, or the fallback card when none is stored.
    pub fn card_profile(&self) -> CardProfile {
        CardProfile::from_stored(self.get(CARD_PROFILE_KEY).as_deref())
    }

    pub fn set_card_profile(&self, profile: &CardProfile) -> Result<(), serde_json::Error> {
        let raw = serde_json::to_string(profile)?;
        debug!(name = %profile.name, "Card profile stored");
        self.set(CARD_PROFILE_KEY, raw);
        Ok(())
    }
}
