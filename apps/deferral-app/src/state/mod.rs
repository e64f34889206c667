//! # State Module
//!
//! Session state for the deferral flow.
//!
//! ## Why Multiple State Types?
//! Each command receives exactly the state it needs instead of one
//! `AppState` holding everything.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │PaymentsState │  │ SessionStore │  │   UiState    │  │ConfigState │  │
//! │  │              │  │              │  │              │  │            │  │
//! │  │ Arc<Mutex<   │  │ Arc<Mutex<   │  │ loading      │  │ data_dir   │  │
//! │  │  Payments    │  │  HashMap>>   │  │ error banner │  │ currency   │  │
//! │  │  Session>>   │  │ card profile │  │              │  │ max-term   │  │
//! │  │ + watch tx   │  │              │  │              │  │            │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • PaymentsState: Mutex, snapshot published after every write          │
//! │  • SessionStore / UiState: Mutex, short critical sections              │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod payments;
mod session_store;
mod ui;

pub use config::ConfigState;
pub use payments::{PaymentsSession, PaymentsState};
pub use session_store::{SessionStore, CARD_PROFILE_KEY};
pub use ui::{UiSnapshot, UiState};
