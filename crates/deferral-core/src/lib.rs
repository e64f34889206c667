//! # deferral-core: Pure Deferral Engine
//!
//! Everything that turns pending purchases into a confirmed installment
//! plan lives here, as pure functions and plain data with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Deferral Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Views (external)                             │   │
//! │  │   Selection ──► Simulator ──► Confirm ──► Receipt   History     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                deferral-app (session + data source)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ deferral-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────┐ │   │
//! │  │   │  model   │ │ classify │ │selection │ │simulator │ │summ- │ │   │
//! │  │   │ Purchase │►│ Buckets  │►│ Tracker  │►│ Simulated│►│ ary  │ │   │
//! │  │   │  Offer   │ │  ×12     │ │          │ │  Entry   │ │Record│ │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘ └──────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO ASYNC • DETERMINISTIC (except invoice/timestamp)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`model`] - Purchases, offers, history records, card profile
//! - [`classify`] - Twelve (type, term) buckets
//! - [`selection`] - Selection state across buckets
//! - [`simulator`] - Term re-projection for interest-bearing entries
//! - [`summary`] - Confirmation record
//! - [`format`] - Display rounding
//! - [`validation`] - Input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use deferral_core::{classify, summarize, ClassifyOptions, SelectionTracker, TermSimulator};
//! use deferral_core::{BucketKey, OfferType, Purchase, PurchaseOffer, Term};
//!
//! let purchase = Purchase {
//!     id: 1,
//!     merchant_name: "LIVERPOOL".to_string(),
//!     purchase_date: "2024-02-01".to_string(),
//!     purchase_amount: 1000.0,
//!     offers: vec![PurchaseOffer {
//!         id: 10,
//!         offer_type: OfferType::Mci,
//!         term_months: "6".to_string(),
//!         total_due: Some(1050.0),
//!         monthly_rate: Some(0.008),
//!     }],
//! };
//!
//! let mut tracker = SelectionTracker::new(classify(&[purchase], ClassifyOptions::default()));
//! tracker.toggle(BucketKey::new(OfferType::Mci, Term::M6), 1).unwrap();
//!
//! let mut simulator = TermSimulator::new();
//! simulator.select_term(Term::M6).unwrap();
//! let simulated = simulator.simulate(&tracker.selected_entries());
//!
//! let record = summarize(&simulated).unwrap();
//! assert_eq!(record.monthly_payment_total, 175.0);
//! assert_eq!(record.annual_rate_pct, "9.60");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod classify;
pub mod error;
pub mod format;
pub mod model;
pub mod selection;
pub mod simulator;
pub mod summary;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use classify::{classify, regroup, Bucket, BucketCounter, BucketKey, Buckets, ClassifyOptions, PaymentGroupEntry};
pub use error::{CoreError, CoreResult, ValidationError};
pub use format::Money;
pub use model::*;
pub use selection::{SelectionSnapshot, SelectionTracker};
pub use simulator::{simulate, SimulatedEntry, SimulationSummary, TermSimulator};
pub use summary::{summarize, summarize_at, ConfirmationRecord};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Terms the simulator offers, shortest first.
pub const SIMULATOR_TERMS: [Term; 5] = [Term::M6, Term::M9, Term::M12, Term::M18, Term::M24];

/// Term the simulator starts on, whether or not any offer exists for it.
pub const DEFAULT_SIMULATOR_TERM: Term = Term::M24;

/// Longest merchant name shown untruncated in a bucket entry.
pub const TITLE_MAX_CHARS: usize = 23;

/// Invoice numbers are drawn uniformly from this range (nine digits).
pub const INVOICE_MIN: u64 = 100_000_000;
pub const INVOICE_MAX: u64 = 999_999_999;
