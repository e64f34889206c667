//! # Deferral App Library
//!
//! Session orchestration for the deferred-payment flow.
//!
//! ## Module Organization
//! ```text
//! deferral_app/
//! ├── lib.rs           ◄─── You are here (tracing, CLI driver)
//! ├── source.rs        ◄─── DataSource trait, JSON and in-memory sources
//! ├── state/
//! │   ├── mod.rs       ◄─── State type exports
//! │   ├── payments.rs  ◄─── Session: buckets, simulator, confirmation
//! │   ├── session_store.rs ◄─ Card profile key-value store
//! │   ├── ui.rs        ◄─── Loading flag, error banner
//! │   └── config.rs    ◄─── Configuration state
//! ├── commands/
//! │   ├── mod.rs       ◄─── Navigation outcomes
//! │   ├── load.rs      ◄─── Concurrent fetch
//! │   ├── selection.rs ◄─── Bucket selection
//! │   ├── simulator.rs ◄─── Term simulation
//! │   ├── confirm.rs   ◄─── Terms and confirmation
//! │   ├── receipt.rs   ◄─── Receipt
//! │   └── history.rs   ◄─── Deferred history
//! └── error.rs         ◄─── API error type for commands
//! ```

pub mod commands;
pub mod error;
pub mod source;
pub mod state;

use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use deferral_core::{BucketKey, CoreError, OfferType};

use crate::commands::{confirm, history, load, receipt, selection, simulator, Routed};
use crate::error::{ApiError, ErrorCode, FETCH_FAILURE_MESSAGE};
use crate::source::JsonFileSource;
use crate::state::{ConfigState, PaymentsState, SessionStore, UiState};

/// What the CLI driver was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Print the twelve buckets.
    Buckets,
    /// Print the deferred-purchase history.
    History,
    /// Select every purchase's longest MCI offer and simulate a term.
    Simulate(String),
    /// Same as `Simulate`, then accept terms, confirm and print the receipt.
    Confirm(String),
}

impl CliCommand {
    /// Parses arguments after the program name.
    pub fn parse(args: &[String]) -> Result<Self, ApiError> {
        match args.first().map(String::as_str) {
            None | Some("buckets") => Ok(CliCommand::Buckets),
            Some("history") => Ok(CliCommand::History),
            Some(verb @ ("simulate" | "confirm")) => {
                let term = args
                    .get(1)
                    .cloned()
                    .unwrap_or_else(|| deferral_core::DEFAULT_SIMULATOR_TERM.to_string());
                if verb == "simulate" {
                    Ok(CliCommand::Simulate(term))
                } else {
                    Ok(CliCommand::Confirm(term))
                }
            }
            Some(other) => Err(ApiError::validation(format!(
                "Unknown command '{}'. Use: buckets | history | simulate <term> | confirm <term>",
                other
            ))),
        }
    }
}

/// Runs the CLI driver against the configured data directory.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging ──► EnvFilter, default info,deferral=debug       │
/// │  2. Load Configuration ──► ConfigState::from_env                        │
/// │  3. Create State ────────► PaymentsState, SessionStore, UiState         │
/// │  4. Load Documents ──────► load_all (three concurrent fetches)          │
/// │  5. Run Command ─────────► print the resulting view as JSON             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    info!("Starting deferral session");

    let command = CliCommand::parse(&args)?;
    let config = ConfigState::from_env();
    info!(data_dir = %config.data_dir.display(), "Configuration loaded");

    let source = JsonFileSource::new(config.data_dir.clone());
    let payments = PaymentsState::new(config.classify_options());
    let store = SessionStore::new();
    let ui = UiState::new();

    let report = load::load_all(&source, &payments, &ui).await;
    if let Some(banner) = ui.snapshot().error_banner {
        eprintln!("{}", banner);
    }
    if !report.purchases && command != CliCommand::History {
        return Err(ApiError::new(ErrorCode::FetchFailure, FETCH_FAILURE_MESSAGE).into());
    }

    match command {
        CliCommand::Buckets => print_json(&selection::get_selection(&payments, &config)),
        CliCommand::History => print_json(&history::list_history(&payments, &config)),
        CliCommand::Simulate(term) => {
            select_longest_mci_offers(&payments, &config)?;
            print_json(&enter_and_simulate(&payments, &config, &term)?)
        }
        CliCommand::Confirm(term) => {
            select_longest_mci_offers(&payments, &config)?;
            enter_and_simulate(&payments, &config, &term)?;
            simulator::continue_to_confirm(&payments)?;
            confirm::set_terms_accepted(&payments, &store, &config, true);
            confirm::confirm(&payments)?;

            let view = receipt::open_receipt(&payments, &store, &config)
                .into_view()
                .ok_or_else(ApiError::missing_confirmation)?;
            print_json(&view)?;
            receipt::leave_receipt(&payments);
            Ok(())
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=deferral_core=trace` - Trace the engine only
/// - Default: INFO, DEBUG for the deferral crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,deferral=debug"));

    // A second initialization (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Selects, for every purchase, the entry in the bucket of its longest
/// interest-bearing offer.
fn select_longest_mci_offers(payments: &PaymentsState, config: &ConfigState) -> Result<(), ApiError> {
    let mut targets: Vec<(BucketKey, i64)> = payments.with_session(|s| {
        s.tracker()
            .buckets()
            .iter()
            .filter(|b| b.key.offer_type == OfferType::Mci)
            .flat_map(|b| {
                b.entries
                    .iter()
                    .filter(|e| e.is_max_term())
                    .map(move |e| (b.key, e.id))
            })
            .collect()
    });
    // A purchase may carry the same offer twice; toggling it twice would undo it.
    targets.sort_by_key(|(key, id)| (key.to_string(), *id));
    targets.dedup();

    for (key, id) in targets {
        selection::toggle_entry(payments, config, key, id)?;
    }
    selection::continue_to_simulator(payments)?;
    Ok(())
}

fn enter_and_simulate(
    payments: &PaymentsState,
    config: &ConfigState,
    term: &str,
) -> Result<simulator::SimulatorView, ApiError> {
    if let Routed::Redirect(_) = simulator::enter_simulator(payments, config) {
        return Err(CoreError::EmptySelection.into());
    }
    simulator::select_term(payments, config, term)
}
