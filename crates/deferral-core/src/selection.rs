//! # Selection Tracker
//!
//! Which bucket entries the user picked, and the totals derived from them.
//!
//! ## Selection Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Buckets own the `selected` flag. Nothing else is stored:               │
//! │                                                                         │
//! │   toggle(12 MSI, #7)                                                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌──────────┐  ┌──────────┐        ┌──────────┐                        │
//! │   │ 24 MSI   │  │ 12 MSI   │  ...   │  6 MCI   │                        │
//! │   │  #7  [ ] │  │  #7  [x] │ ◄──    │  #7  [ ] │  same purchase, other  │
//! │   └──────────┘  └──────────┘        └──────────┘  buckets untouched     │
//! │                                                                         │
//! │   count / total / entries  ◄── recomputed from the buckets on read      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::classify::{BucketKey, Buckets, PaymentGroupEntry};
use crate::error::{CoreError, CoreResult};
use crate::model::PurchaseId;

// =============================================================================
// Snapshot
// =============================================================================

/// Published view of the current selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    /// Number of selected entries across all buckets.
    pub count: usize,

    /// Sum of `total` (or `baseAmount` when zero) over selected entries.
    pub total: f64,

    /// "Continue" is only enabled with a non-empty selection.
    pub can_continue: bool,
}

// =============================================================================
// Tracker
// =============================================================================

/// Selection state over the twelve buckets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionTracker {
    buckets: Buckets,
}

impl SelectionTracker {
    /// Wraps freshly classified buckets.
    pub fn new(buckets: Buckets) -> Self {
        SelectionTracker { buckets }
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    /// Flips the `selected` flag of entry `id` in bucket `key`.
    ///
    /// Every entry of that bucket carrying the id receives the same new
    /// value; other buckets are never touched. Returns the new value.
    pub fn toggle(&mut self, key: BucketKey, id: PurchaseId) -> CoreResult<bool> {
        let current = self
            .find(key, id)
            .map(|entry| entry.selected)
            .ok_or(CoreError::EntryNotFound { bucket: key, id })?;

        self.set_selected(key, id, !current)?;
        Ok(!current)
    }

    /// Sets the `selected` flag of entry `id` in bucket `key`.
    pub fn set_selected(&mut self, key: BucketKey, id: PurchaseId, selected: bool) -> CoreResult<()> {
        let bucket = self
            .buckets
            .get_mut(key)
            .ok_or(CoreError::EntryNotFound { bucket: key, id })?;

        let mut found = false;
        for entry in bucket.entries.iter_mut().filter(|e| e.id == id) {
            entry.selected = selected;
            found = true;
        }

        if !found {
            return Err(CoreError::EntryNotFound { bucket: key, id });
        }

        debug!(bucket = %key, id, selected, "Selection changed");
        Ok(())
    }

    /// Selected entries across all buckets, in bucket order.
    pub fn selected_entries(&self) -> Vec<PaymentGroupEntry> {
        self.buckets
            .entries()
            .filter(|e| e.selected)
            .cloned()
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.buckets.entries().filter(|e| e.selected).count()
    }

    /// Sum of `total`, falling back to `baseAmount`, over selected entries.
    pub fn selected_total(&self) -> f64 {
        self.buckets
            .entries()
            .filter(|e| e.selected)
            .map(PaymentGroupEntry::total_or_base)
            .sum()
    }

    /// Number of selected entries, or `EmptySelection` when there are none.
    pub fn ensure_selected(&self) -> CoreResult<usize> {
        match self.selected_count() {
            0 => Err(CoreError::EmptySelection),
            count => Ok(count),
        }
    }

    /// Forces every entry of every bucket to unselected.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            for entry in bucket.entries.iter_mut() {
                entry.selected = false;
            }
        }
    }

    /// Applies the externally observed selection count.
    ///
    /// When the shared selection has been emptied by another flow, the
    /// buckets are rewritten with every entry unselected. Returns true
    /// when a rewrite happened.
    pub fn reconcile(&mut self, observed_count: usize) -> bool {
        if observed_count == 0 && self.selected_count() > 0 {
            self.clear();
            debug!("Selection reconciled to empty");
            return true;
        }
        false
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        let count = self.selected_count();
        SelectionSnapshot {
            count,
            total: self.selected_total(),
            can_continue: count > 0,
        }
    }

    fn find(&self, key: BucketKey, id: PurchaseId) -> Option<&PaymentGroupEntry> {
        self.buckets
            .get(key)
            .and_then(|bucket| bucket.entries.iter().find(|e| e.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, ClassifyOptions};
    use crate::model::{OfferType, Purchase, PurchaseOffer, Term};

    fn tracker() -> SelectionTracker {
        let purchases = vec![
            Purchase {
                id: 1,
                merchant_name: "LIVERPOOL".to_string(),
                purchase_date: "2024-02-01".to_string(),
                purchase_amount: 1000.0,
                offers: vec![
                    PurchaseOffer {
                        id: 10,
                        offer_type: OfferType::Mci,
                        term_months: "6".to_string(),
                        total_due: Some(1050.0),
                        monthly_rate: Some(0.008),
                    },
                    PurchaseOffer {
                        id: 11,
                        offer_type: OfferType::Msi,
                        term_months: "6".to_string(),
                        total_due: None,
                        monthly_rate: None,
                    },
                ],
            },
            Purchase {
                id: 2,
                merchant_name: "OXXO".to_string(),
                purchase_date: "2024-01-15".to_string(),
                purchase_amount: 300.0,
                offers: vec![PurchaseOffer {
                    id: 20,
                    offer_type: OfferType::Msi,
                    term_months: "6".to_string(),
                    total_due: None,
                    monthly_rate: None,
                }],
            },
        ];
        SelectionTracker::new(classify(&purchases, ClassifyOptions::default()))
    }

    const MCI6: BucketKey = BucketKey::new(OfferType::Mci, Term::M6);
    const MSI6: BucketKey = BucketKey::new(OfferType::Msi, Term::M6);

    #[test]
    fn test_toggle_only_touches_its_bucket() {
        let mut tracker = tracker();
        assert!(tracker.toggle(MCI6, 1).unwrap());

        let msi_entry = &tracker.buckets().get(MSI6).unwrap().entries[0];
        assert_eq!(msi_entry.id, 1);
        assert!(!msi_entry.selected);
        assert_eq!(tracker.selected_count(), 1);
        assert_eq!(tracker.selected_total(), 1050.0);
    }

    #[test]
    fn test_total_falls_back_to_base_amount() {
        let mut tracker = tracker();
        tracker.toggle(MSI6, 1).unwrap();
        tracker.toggle(MSI6, 2).unwrap();
        assert_eq!(tracker.selected_total(), 1300.0);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.count, 2);
        assert!(snapshot.can_continue);
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let mut tracker = tracker();
        tracker.toggle(MSI6, 2).unwrap();
        let before = tracker.snapshot();

        assert!(tracker.toggle(MCI6, 1).unwrap());
        assert!(!tracker.toggle(MCI6, 1).unwrap());
        assert_eq!(tracker.snapshot(), before);
    }

    #[test]
    fn test_unknown_entry() {
        let mut tracker = tracker();
        let err = tracker.toggle(MCI6, 2).unwrap_err();
        assert!(matches!(err, CoreError::EntryNotFound { id: 2, .. }));

        let missing = BucketKey::new(OfferType::Mci, Term::M24);
        assert!(tracker.toggle(missing, 1).is_err());
    }

    #[test]
    fn test_ensure_selected() {
        let mut tracker = tracker();
        assert!(matches!(tracker.ensure_selected(), Err(CoreError::EmptySelection)));

        tracker.toggle(MCI6, 1).unwrap();
        assert_eq!(tracker.ensure_selected().unwrap(), 1);
    }

    #[test]
    fn test_reconcile_clears_all_buckets() {
        let mut tracker = tracker();
        tracker.toggle(MCI6, 1).unwrap();
        tracker.toggle(MSI6, 2).unwrap();

        assert!(!tracker.reconcile(2));
        assert_eq!(tracker.selected_count(), 2);

        assert!(tracker.reconcile(0));
        assert_eq!(tracker.selected_count(), 0);
        assert!(tracker.buckets().entries().all(|e| !e.selected));
        assert_eq!(tracker.snapshot(), SelectionSnapshot::default());
    }
}
