//! # Classification Engine
//!
//! Explodes purchases with embedded offers into twelve (type, term) buckets.
//!
//! ## Bucket Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    classify(purchases)                                  │
//! │                                                                         │
//! │  Purchase #1 ── offers: [MCI 6, MSI 12]                                 │
//! │  Purchase #2 ── offers: [MSI 12, MSI 24]                                │
//! │        │                                                                │
//! │        ▼  one entry per (purchase × matching offer)                     │
//! │                                                                         │
//! │  index  key        entries (date desc, stable)                          │
//! │  ─────  ─────────  ───────────────────────────                          │
//! │    0    24 MSI     #2                                                   │
//! │    1    24 MCI     -                                                    │
//! │    2    18 MSI     -                                                    │
//! │    3    18 MCI     -                                                    │
//! │    4    12 MSI     #2, #1     ◄── same purchase may appear in several   │
//! │    5    12 MCI     -              buckets; entries are never merged     │
//! │   ...                                                                   │
//! │    9     6 MCI     #1                                                   │
//! │   10     3 MSI     -                                                    │
//! │   11     3 MCI     -                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Max-Term Flags
//! `max_msi_term` / `max_mci_term` are the longest MSI/MCI terms offered by
//! the entry's OWN purchase, never a running maximum across the purchases
//! of a pass.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::model::{parse_purchase_date, OfferType, Purchase, PurchaseId, PurchaseOffer, Term};
use crate::TITLE_MAX_CHARS;

// =============================================================================
// Bucket Key
// =============================================================================

/// Identifies one of the twelve buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BucketKey {
    #[serde(rename = "type")]
    pub offer_type: OfferType,

    #[ts(type = "string")]
    #[serde(rename = "termMonths")]
    pub term: Term,
}

impl BucketKey {
    pub const fn new(offer_type: OfferType, term: Term) -> Self {
        BucketKey { offer_type, term }
    }

    /// All twelve keys in publication order: 24/18/12/9/6/3 months, MSI
    /// before MCI within a term.
    pub fn all() -> [BucketKey; 12] {
        let mut keys = [BucketKey::new(OfferType::Msi, Term::M24); 12];
        for (i, term) in Term::ALL.iter().enumerate() {
            keys[i * 2] = BucketKey::new(OfferType::Msi, *term);
            keys[i * 2 + 1] = BucketKey::new(OfferType::Mci, *term);
        }
        keys
    }

    /// Returns true when the offer has this key's type and term.
    pub fn matches(&self, offer: &PurchaseOffer) -> bool {
        offer.offer_type == self.offer_type && offer.term() == Some(self.term)
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.term, self.offer_type)
    }
}

// =============================================================================
// Payment Group Entry
// =============================================================================

/// One (purchase × matching offer) row of a bucket.
///
/// `id` is the purchase id, so the same id may live in several buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentGroupEntry {
    pub id: PurchaseId,

    /// Merchant name, truncated for list display.
    pub title: String,

    /// Purchase date as delivered.
    pub date: String,

    /// Purchase amount before interest.
    pub base_amount: f64,

    pub selected: bool,

    pub offer_id: i64,

    #[ts(type = "string")]
    #[serde(rename = "termMonths")]
    pub term: Term,

    #[serde(rename = "type")]
    pub offer_type: OfferType,

    /// Total due for the offer (0.0 when absent).
    pub total: f64,

    /// Monthly interest rate (0.0 when absent).
    pub rate: f64,

    #[ts(type = "string | null")]
    pub max_msi_term: Option<Term>,

    #[ts(type = "string | null")]
    pub max_mci_term: Option<Term>,
}

impl PaymentGroupEntry {
    fn from_offer(purchase: &Purchase, offer: &PurchaseOffer, term: Term) -> Self {
        PaymentGroupEntry {
            id: purchase.id,
            title: truncate_title(&purchase.merchant_name),
            date: purchase.purchase_date.clone(),
            base_amount: purchase.purchase_amount,
            selected: false,
            offer_id: offer.id,
            term,
            offer_type: offer.offer_type,
            total: offer.total_or_zero(),
            rate: offer.rate_or_zero(),
            max_msi_term: purchase.max_term(OfferType::Msi),
            max_mci_term: purchase.max_term(OfferType::Mci),
        }
    }

    /// Total when the offer carries one, otherwise the base amount.
    #[inline]
    pub fn total_or_base(&self) -> f64 {
        if self.total != 0.0 {
            self.total
        } else {
            self.base_amount
        }
    }

    /// Payment per month at the entry's own term.
    #[inline]
    pub fn monthly_payment(&self) -> f64 {
        self.total_or_base() / self.term.as_f64()
    }

    /// Returns true when the entry's term is its purchase's longest term
    /// for the entry's type.
    pub fn is_max_term(&self) -> bool {
        let max = match self.offer_type {
            OfferType::Msi => self.max_msi_term,
            OfferType::Mci => self.max_mci_term,
        };
        max == Some(self.term)
    }
}

/// Truncates a merchant name to [`TITLE_MAX_CHARS`] characters, appending
/// `"..."` when anything was cut.
pub fn truncate_title(name: &str) -> String {
    if name.chars().count() > TITLE_MAX_CHARS {
        let mut title: String = name.chars().take(TITLE_MAX_CHARS).collect();
        title.push_str("...");
        title
    } else {
        name.to_string()
    }
}

// =============================================================================
// Buckets
// =============================================================================

/// Entries of one (type, term) combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Bucket {
    pub key: BucketKey,
    pub entries: Vec<PaymentGroupEntry>,
}

/// Number of entries available in a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BucketCounter {
    pub key: BucketKey,
    pub available: usize,
}

/// The twelve buckets, always in [`BucketKey::all`] order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Buckets {
    groups: Vec<Bucket>,
}

impl Buckets {
    /// Twelve empty buckets.
    pub fn empty() -> Self {
        Buckets {
            groups: BucketKey::all()
                .into_iter()
                .map(|key| Bucket {
                    key,
                    entries: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn get(&self, key: BucketKey) -> Option<&Bucket> {
        self.groups.iter().find(|b| b.key == key)
    }

    pub fn get_mut(&mut self, key: BucketKey) -> Option<&mut Bucket> {
        self.groups.iter_mut().find(|b| b.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bucket> {
        self.groups.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Bucket> {
        self.groups.iter_mut()
    }

    /// Every entry of every bucket, in publication order.
    pub fn entries(&self) -> impl Iterator<Item = &PaymentGroupEntry> {
        self.groups.iter().flat_map(|b| b.entries.iter())
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|b| b.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The outbound bucket-of-buckets: twelve inner lists in fixed order.
    pub fn flatten(&self) -> Vec<Vec<PaymentGroupEntry>> {
        self.groups.iter().map(|b| b.entries.clone()).collect()
    }

    /// Available-entry counters, one per bucket.
    pub fn counters(&self) -> Vec<BucketCounter> {
        self.groups
            .iter()
            .map(|b| BucketCounter {
                key: b.key,
                available: b.entries.len(),
            })
            .collect()
    }
}

impl Default for Buckets {
    fn default() -> Self {
        Buckets::empty()
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Classification switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Keep only entries whose term is their purchase's longest term for
    /// that type ("most favorable offer only").
    pub only_max_term: bool,
}

/// Classifies purchases into all twelve buckets.
///
/// Every entry starts unselected.
pub fn classify(purchases: &[Purchase], options: ClassifyOptions) -> Buckets {
    let mut buckets = Buckets::empty();
    for bucket in buckets.iter_mut() {
        bucket.entries = regroup(purchases, bucket.key, options);
    }

    debug!(
        purchases = purchases.len(),
        entries = buckets.len(),
        only_max_term = options.only_max_term,
        "Classified purchases"
    );
    buckets
}

/// Builds the entries of a single bucket.
///
/// ## Steps
/// 1. One entry per (purchase × offer) matching `key`, unselected
/// 2. Max-term flags from the entry's own purchase
/// 3. Optional max-term filter
/// 4. Stable sort by purchase date, most recent first
pub fn regroup(purchases: &[Purchase], key: BucketKey, options: ClassifyOptions) -> Vec<PaymentGroupEntry> {
    let mut entries: Vec<PaymentGroupEntry> = purchases
        .iter()
        .flat_map(|purchase| {
            purchase
                .offers
                .iter()
                .filter(|offer| key.matches(offer))
                .map(move |offer| PaymentGroupEntry::from_offer(purchase, offer, key.term))
        })
        .collect();

    if options.only_max_term {
        entries.retain(PaymentGroupEntry::is_max_term);
    }

    sort_by_date_desc(&mut entries);
    entries
}

/// Stable sort, most recent first. Unparseable dates go last, keeping
/// their input order.
fn sort_by_date_desc(entries: &mut [PaymentGroupEntry]) {
    entries.sort_by_cached_key(|entry| std::cmp::Reverse(DateKey(parse_purchase_date(&entry.date))));
}

/// Orders parsed dates before unparseable ones.
#[derive(PartialEq, Eq)]
struct DateKey(Option<chrono::NaiveDateTime>);

impl Ord for DateKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }
}

impl PartialOrd for DateKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(id: i64, offer_type: OfferType, term: &str, total: Option<f64>, rate: Option<f64>) -> PurchaseOffer {
        PurchaseOffer {
            id,
            offer_type,
            term_months: term.to_string(),
            total_due: total,
            monthly_rate: rate,
        }
    }

    fn purchase(id: PurchaseId, date: &str, offers: Vec<PurchaseOffer>) -> Purchase {
        Purchase {
            id,
            merchant_name: format!("Merchant {}", id),
            purchase_date: date.to_string(),
            purchase_amount: 1000.0,
            offers,
        }
    }

    #[test]
    fn test_bucket_key_order() {
        let keys = BucketKey::all();
        assert_eq!(keys[0], BucketKey::new(OfferType::Msi, Term::M24));
        assert_eq!(keys[1], BucketKey::new(OfferType::Mci, Term::M24));
        assert_eq!(keys[4], BucketKey::new(OfferType::Msi, Term::M12));
        assert_eq!(keys[11], BucketKey::new(OfferType::Mci, Term::M3));
    }

    #[test]
    fn test_truncate_title() {
        assert_eq!(truncate_title("OXXO"), "OXXO");
        assert_eq!(truncate_title(&"A".repeat(23)), "A".repeat(23));
        assert_eq!(
            truncate_title("ABCDEFGHIJKLMNOPQRSTUVWXYZ"),
            "ABCDEFGHIJKLMNOPQRSTUVW..."
        );
        // Counted in characters, not bytes
        assert_eq!(truncate_title(&"ñ".repeat(24)), format!("{}...", "ñ".repeat(23)));
    }

    #[test]
    fn test_classify_example_purchase() {
        let purchases = vec![purchase(
            1,
            "2024-02-01",
            vec![
                offer(10, OfferType::Mci, "6", Some(1050.0), Some(0.008)),
                offer(11, OfferType::Msi, "12", None, None),
            ],
        )];

        let buckets = classify(&purchases, ClassifyOptions::default());
        assert_eq!(buckets.len(), 2);

        let mci = &buckets
            .get(BucketKey::new(OfferType::Mci, Term::M6))
            .unwrap()
            .entries[0];
        assert_eq!(mci.total, 1050.0);
        assert_eq!(mci.rate, 0.008);
        assert!(!mci.selected);

        let msi = &buckets
            .get(BucketKey::new(OfferType::Msi, Term::M12))
            .unwrap()
            .entries[0];
        assert_eq!(msi.total, 0.0);
        assert_eq!(msi.rate, 0.0);
        assert_eq!(msi.max_msi_term, Some(Term::M12));
        assert_eq!(msi.max_mci_term, Some(Term::M6));
    }

    #[test]
    fn test_max_term_not_shared_between_purchases() {
        let purchases = vec![
            purchase(1, "2024-01-01", vec![offer(1, OfferType::Msi, "24", None, None)]),
            purchase(
                2,
                "2024-01-02",
                vec![
                    offer(2, OfferType::Msi, "6", None, None),
                    offer(3, OfferType::Msi, "24", None, None),
                ],
            ),
            purchase(3, "2024-01-03", vec![offer(4, OfferType::Msi, "6", None, None)]),
        ];

        let entries = regroup(
            &purchases,
            BucketKey::new(OfferType::Msi, Term::M6),
            ClassifyOptions::default(),
        );
        assert_eq!(entries.len(), 2);
        // Purchase 3 only offers 6 months, whatever purchase 2 offers.
        assert_eq!(entries[0].id, 3);
        assert_eq!(entries[0].max_msi_term, Some(Term::M6));
        assert_eq!(entries[1].id, 2);
        assert_eq!(entries[1].max_msi_term, Some(Term::M24));
    }

    #[test]
    fn test_only_max_term_filter() {
        let purchases = vec![
            purchase(
                1,
                "2024-01-01",
                vec![
                    offer(1, OfferType::Msi, "6", None, None),
                    offer(2, OfferType::Msi, "12", None, None),
                ],
            ),
            purchase(2, "2024-01-02", vec![offer(3, OfferType::Msi, "6", None, None)]),
        ];
        let options = ClassifyOptions { only_max_term: true };

        let six = regroup(&purchases, BucketKey::new(OfferType::Msi, Term::M6), options);
        assert_eq!(six.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2]);

        let twelve = regroup(&purchases, BucketKey::new(OfferType::Msi, Term::M12), options);
        assert_eq!(twelve.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_sort_desc_stable_with_invalid_dates_last() {
        let six = |id| offer(id, OfferType::Mci, "6", Some(1100.0), Some(0.01));
        let purchases = vec![
            purchase(1, "2024-01-01", vec![six(1)]),
            purchase(2, "not a date", vec![six(2)]),
            purchase(3, "2024-03-01", vec![six(3)]),
            purchase(4, "2024-01-01", vec![six(4)]),
            purchase(5, "", vec![six(5)]),
        ];

        let entries = regroup(
            &purchases,
            BucketKey::new(OfferType::Mci, Term::M6),
            ClassifyOptions::default(),
        );
        let ids: Vec<PurchaseId> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1, 4, 2, 5]);
    }

    #[test]
    fn test_malformed_terms_match_nothing() {
        let purchases = vec![purchase(
            1,
            "2024-01-01",
            vec![
                offer(1, OfferType::Mci, "seis", Some(1.0), Some(0.1)),
                offer(2, OfferType::Mci, "7", Some(1.0), Some(0.1)),
            ],
        )];
        let buckets = classify(&purchases, ClassifyOptions::default());
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_flatten_and_counters() {
        let purchases = vec![purchase(
            1,
            "2024-01-01",
            vec![offer(1, OfferType::Msi, "24", None, None)],
        )];
        let buckets = classify(&purchases, ClassifyOptions::default());

        let flat = buckets.flatten();
        assert_eq!(flat.len(), 12);
        assert_eq!(flat[0].len(), 1);
        assert!(flat[1..].iter().all(Vec::is_empty));

        let counters = buckets.counters();
        assert_eq!(counters[0].available, 1);
        assert_eq!(counters.iter().map(|c| c.available).sum::<usize>(), 1);
    }
}
