//! # Payments State
//!
//! The session: loaded documents, bucket selection, simulator and the
//! confirmation record.
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<T>>`. Every mutation goes through
//! [`PaymentsState::with_session_mut`], which publishes the recomputed
//! selection snapshot on a `watch` channel before the lock is released.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Operations                                   │
//! │                                                                         │
//! │  User Action              Command                  Session Change       │
//! │  ───────────              ───────                  ──────────────       │
//! │                                                                         │
//! │  Open app ───────────────► load_all() ───────────► replace_purchases   │
//! │                                                    (rebuild, reset sim) │
//! │                                                                         │
//! │  Tap entry ──────────────► toggle_entry() ───────► tracker.toggle      │
//! │                                                                         │
//! │  Change term ────────────► select_term() ────────► simulator.term      │
//! │                                                                         │
//! │  Confirm ────────────────► confirm() ────────────► confirmation = Some │
//! │                                                                         │
//! │  Leave receipt ──────────► leave_receipt() ──────► clear_selections    │
//! │                                                    (unselect, no rec.) │
//! │                                                                         │
//! │  Every write ──► selection snapshot published to subscribers            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, info};

use deferral_core::{
    classify, validation::validate_purchase, ClassifyOptions, ConfirmationRecord,
    DeferredPurchase, OfferType, Purchase, PurchaseId, SelectionSnapshot, SelectionTracker,
    SimulatedEntry, SimulationSummary, TermSimulator, TermsText,
};

// =============================================================================
// Session
// =============================================================================

/// Everything one user session knows.
#[derive(Debug, Clone, Default)]
pub struct PaymentsSession {
    purchases: Vec<Purchase>,
    deferred: Vec<DeferredPurchase>,
    terms: Option<TermsText>,
    options: ClassifyOptions,
    tracker: SelectionTracker,
    simulator: TermSimulator,
    terms_accepted: bool,
    confirming: bool,
    confirmation: Option<ConfirmationRecord>,
    load_ticket: u64,
}

impl PaymentsSession {
    pub fn new(options: ClassifyOptions) -> Self {
        PaymentsSession {
            options,
            ..PaymentsSession::default()
        }
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Starts a load. Results carrying an older ticket are discarded.
    pub fn next_load_ticket(&mut self) -> u64 {
        self.load_ticket += 1;
        self.load_ticket
    }

    /// Stops observing the in-flight load, if any.
    pub fn abandon_load(&mut self) {
        self.load_ticket += 1;
    }

    pub fn is_current_load(&self, ticket: u64) -> bool {
        self.load_ticket == ticket
    }

    /// Full reload: new purchase list, fresh buckets, simulator reset.
    pub fn replace_purchases(&mut self, purchases: Vec<Purchase>) {
        for purchase in &purchases {
            if let Err(err) = validate_purchase(purchase) {
                tracing::warn!(id = purchase.id, %err, "Suspicious purchase record");
            }
        }

        self.tracker = SelectionTracker::new(classify(&purchases, self.options));
        self.purchases = purchases;
        self.simulator.reset();
        self.terms_accepted = false;
        self.confirming = false;
        self.confirmation = None;

        info!(
            purchases = self.purchases.len(),
            entries = self.tracker.buckets().len(),
            "Purchases loaded"
        );
    }

    pub fn replace_deferred(&mut self, deferred: Vec<DeferredPurchase>) {
        debug!(count = deferred.len(), "Deferred purchases loaded");
        self.deferred = deferred;
    }

    pub fn set_terms(&mut self, terms: TermsText) {
        self.terms = Some(terms);
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn purchases(&self) -> &[Purchase] {
        &self.purchases
    }

    pub fn deferred(&self) -> &[DeferredPurchase] {
        &self.deferred
    }

    pub fn terms(&self) -> Option<&TermsText> {
        self.terms.as_ref()
    }

    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut SelectionTracker {
        &mut self.tracker
    }

    pub fn simulator(&self) -> &TermSimulator {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut TermSimulator {
        &mut self.simulator
    }

    pub fn confirmation(&self) -> Option<&ConfirmationRecord> {
        self.confirmation.as_ref()
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Drops every selection and the confirmation record, keeping the
    /// loaded documents and buckets. Every entry ends up unselected.
    pub fn clear_selections(&mut self) {
        self.tracker.reconcile(0);
        self.terms_accepted = false;
        self.confirming = false;
        self.confirmation = None;
        debug!("Selections cleared");
    }

    /// Returns true when at least one selected entry is interest-bearing.
    pub fn has_simulatable_selection(&self) -> bool {
        self.tracker
            .selected_entries()
            .iter()
            .any(|e| e.offer_type == OfferType::Mci)
    }

    // -------------------------------------------------------------------------
    // Simulation
    // -------------------------------------------------------------------------

    /// Selected entries projected onto the simulator's term.
    pub fn simulated(&self) -> Vec<SimulatedEntry> {
        self.simulator.simulate(&self.tracker.selected_entries())
    }

    pub fn simulation_summary(&self) -> SimulationSummary {
        SimulationSummary::from_entries(&self.simulated())
    }

    pub fn contains_simulated(&self, id: PurchaseId) -> bool {
        self.simulated().iter().any(|e| e.entry.id == id)
    }

    // -------------------------------------------------------------------------
    // Confirmation
    // -------------------------------------------------------------------------

    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.terms_accepted = accepted;
    }

    pub fn is_confirming(&self) -> bool {
        self.confirming
    }

    /// Confirm is enabled with accepted terms, an included entry, and no
    /// confirmation already being produced.
    pub fn can_confirm(&self) -> bool {
        self.terms_accepted && !self.confirming && self.simulated().iter().any(|e| e.included)
    }

    /// Marks a confirmation as in progress and hands out its input.
    pub fn begin_confirmation(&mut self) -> Vec<SimulatedEntry> {
        self.confirming = true;
        self.simulated()
    }

    /// Stores the finished record and re-enables confirm.
    pub fn finish_confirmation(&mut self, record: Option<ConfirmationRecord>) {
        self.confirming = false;
        if record.is_some() {
            self.terms_accepted = false;
        }
        self.confirmation = record;
    }

    pub fn selection_snapshot(&self) -> SelectionSnapshot {
        self.tracker.snapshot()
    }
}

// =============================================================================
// Shared State
// =============================================================================

/// Shared payments session with change notification.
#[derive(Debug)]
pub struct PaymentsState {
    session: Arc<Mutex<PaymentsSession>>,
    selection: watch::Sender<SelectionSnapshot>,
}

impl PaymentsState {
    pub fn new(options: ClassifyOptions) -> Self {
        let (selection, _) = watch::channel(SelectionSnapshot::default());
        PaymentsState {
            session: Arc::new(Mutex::new(PaymentsSession::new(options))),
            selection,
        }
    }

    /// Executes a function with read access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let count = payments.with_session(|s| s.tracker().selected_count());
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&PaymentsSession) -> R,
    {
        let session = self.session.lock().expect("Payments mutex poisoned");
        f(&session)
    }

    /// Executes a function with write access to the session, then
    /// publishes the selection snapshot.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// payments.with_session_mut(|s| s.tracker_mut().toggle(key, id))?;
    /// ```
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut PaymentsSession) -> R,
    {
        let mut session = self.session.lock().expect("Payments mutex poisoned");
        let result = f(&mut session);
        self.selection.send_replace(session.selection_snapshot());
        result
    }

    /// Receiver of the selection snapshot published after every write.
    pub fn subscribe(&self) -> watch::Receiver<SelectionSnapshot> {
        self.selection.subscribe()
    }
}

impl Default for PaymentsState {
    fn default() -> Self {
        Self::new(ClassifyOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deferral_core::{BucketKey, PurchaseOffer, Term};

    fn purchases() -> Vec<Purchase> {
        vec![Purchase {
            id: 1,
            merchant_name: "LIVERPOOL".to_string(),
            purchase_date: "2024-02-01".to_string(),
            purchase_amount: 1000.0,
            offers: vec![PurchaseOffer {
                id: 10,
                offer_type: OfferType::Mci,
                term_months: "6".to_string(),
                total_due: Some(1050.0),
                monthly_rate: Some(0.008),
            }],
        }]
    }

    const MCI6: BucketKey = BucketKey::new(OfferType::Mci, Term::M6);

    #[test]
    fn test_mutation_publishes_snapshot() {
        let state = PaymentsState::default();
        let rx = state.subscribe();

        state.with_session_mut(|s| s.replace_purchases(purchases()));
        state
            .with_session_mut(|s| s.tracker_mut().toggle(MCI6, 1))
            .unwrap();

        let snapshot = *rx.borrow();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.total, 1050.0);
        assert!(snapshot.can_continue);
    }

    #[test]
    fn test_clear_keeps_documents_and_overrides() {
        let mut session = PaymentsSession::new(ClassifyOptions::default());
        session.replace_purchases(purchases());
        session.tracker_mut().toggle(MCI6, 1).unwrap();
        session.simulator_mut().toggle_included(1);

        session.clear_selections();
        assert_eq!(session.purchases().len(), 1);
        assert_eq!(session.tracker().selected_count(), 0);
        assert!(!session.simulator().is_included(1));

        session.replace_purchases(purchases());
        assert!(session.simulator().is_included(1));
    }

    #[test]
    fn test_clear_unselects_every_bucket() {
        let mut session = PaymentsSession::new(ClassifyOptions::default());
        session.replace_purchases(purchases());
        session.tracker_mut().toggle(MCI6, 1).unwrap();
        let buckets_before = session.tracker().buckets().len();

        session.clear_selections();
        assert_eq!(session.tracker().selected_count(), 0);
        assert_eq!(session.tracker().buckets().len(), buckets_before);
        assert!(session.tracker().buckets().entries().all(|e| !e.selected));
    }

    #[test]
    fn test_confirm_gating() {
        let mut session = PaymentsSession::new(ClassifyOptions::default());
        session.replace_purchases(purchases());
        session.tracker_mut().toggle(MCI6, 1).unwrap();
        assert!(!session.can_confirm());

        session.set_terms_accepted(true);
        assert!(session.can_confirm());

        let input = session.begin_confirmation();
        assert_eq!(input.len(), 1);
        assert!(!session.can_confirm());

        session.finish_confirmation(deferral_core::summarize(&input));
        assert!(session.confirmation().is_some());
        assert!(!session.terms_accepted());
    }

    #[test]
    fn test_stale_load_ticket() {
        let mut session = PaymentsSession::default();
        let ticket = session.next_load_ticket();
        assert!(session.is_current_load(ticket));

        session.abandon_load();
        assert!(!session.is_current_load(ticket));
    }
}
