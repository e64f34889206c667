//! # Offer Model
//!
//! Immutable value types describing purchases and their embedded
//! installment offers, exactly as the data source delivers them.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Offer Model                                     │
//! │                                                                         │
//! │  ┌─────────────────┐ 1   N ┌─────────────────┐                          │
//! │  │    Purchase     │──────►│  PurchaseOffer  │                          │
//! │  │  ─────────────  │       │  ─────────────  │                          │
//! │  │  id             │       │  id             │                          │
//! │  │  merchant_name  │       │  offer_type     │  MSI: interest-free      │
//! │  │  purchase_date  │       │  term_months    │  MCI: interest-bearing   │
//! │  │  amount         │       │  total_due?     │                          │
//! │  └─────────────────┘       │  monthly_rate?  │                          │
//! │                            └─────────────────┘                          │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────┐          │
//! │  │DeferredPurchase │  │   TermsText     │  │  CardProfile    │          │
//! │  │ (history only)  │  │                 │  │ (session store) │          │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────┘          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Fields are camelCase on the wire. The legacy feed names (`nomCom`,
//! `fechaCompra`, `montoCompra`, `ofertas`, `tipo`, `noMeses`, `totalPago`,
//! `interesMensual`, `fechaModificacion`) are accepted as aliases.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::format::{annual_rate_pct, monthly_rate_pct, Money};

/// Identifier of a purchase. Shared by every entry derived from it.
pub type PurchaseId = i64;

// =============================================================================
// Offer Type
// =============================================================================

/// Kind of installment offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum OfferType {
    /// Interest-free months ("meses sin intereses").
    #[serde(rename = "MSI")]
    Msi,
    /// Interest-bearing months ("meses con intereses").
    #[serde(rename = "MCI")]
    Mci,
}

impl OfferType {
    /// Returns true for offers that accrue interest.
    #[inline]
    pub const fn is_interest_bearing(&self) -> bool {
        matches!(self, OfferType::Mci)
    }
}

impl fmt::Display for OfferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfferType::Msi => write!(f, "MSI"),
            OfferType::Mci => write!(f, "MCI"),
        }
    }
}

// =============================================================================
// Term
// =============================================================================

/// Installment term in months. Never zero.
///
/// Serialized as a decimal string (`"12"`), the way the feed encodes it.
/// Deserialization also accepts a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term(u32);

impl Term {
    pub const M3: Term = Term(3);
    pub const M6: Term = Term(6);
    pub const M9: Term = Term(9);
    pub const M12: Term = Term(12);
    pub const M18: Term = Term(18);
    pub const M24: Term = Term(24);

    /// Every term that has a bucket, longest first.
    pub const ALL: [Term; 6] = [
        Term::M24,
        Term::M18,
        Term::M12,
        Term::M9,
        Term::M6,
        Term::M3,
    ];

    /// Creates a term from a month count.
    pub fn new(months: u32) -> Result<Self, ValidationError> {
        if months == 0 {
            return Err(ValidationError::InvalidFormat {
                field: "termMonths".to_string(),
                reason: "must be at least one month".to_string(),
            });
        }
        Ok(Term(months))
    }

    /// Returns the number of months.
    #[inline]
    pub const fn months(&self) -> u32 {
        self.0
    }

    /// Month count as a divisor for payment arithmetic.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Term {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "termMonths".to_string(),
            });
        }
        let months = trimmed
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidFormat {
                field: "termMonths".to_string(),
                reason: format!("'{}' is not a whole number of months", trimmed),
            })?;
        Term::new(months)
    }
}

impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Term {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u32),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Raw::Number(months) => Term::new(months).map_err(serde::de::Error::custom),
        }
    }
}

// =============================================================================
// Purchase Offer
// =============================================================================

/// One installment offer embedded in a purchase.
///
/// `total_due` and `monthly_rate` are absent for MSI offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOffer {
    pub id: i64,

    #[serde(rename = "type", alias = "tipo")]
    pub offer_type: OfferType,

    /// Raw term as delivered (`"6"`, `"12"`, ...).
    #[serde(alias = "noMeses")]
    pub term_months: String,

    #[serde(default, alias = "totalPago")]
    pub total_due: Option<f64>,

    #[serde(default, alias = "interesMensual")]
    pub monthly_rate: Option<f64>,
}

impl PurchaseOffer {
    /// Parsed term, or `None` when the feed carries a malformed value.
    pub fn term(&self) -> Option<Term> {
        self.term_months.parse().ok()
    }

    /// Total due, with an absent value read as zero.
    #[inline]
    pub fn total_or_zero(&self) -> f64 {
        self.total_due.unwrap_or(0.0)
    }

    /// Monthly rate, with an absent value read as zero.
    #[inline]
    pub fn rate_or_zero(&self) -> f64 {
        self.monthly_rate.unwrap_or(0.0)
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// A pending purchase that may be converted into an installment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: PurchaseId,

    #[serde(alias = "nomCom")]
    pub merchant_name: String,

    #[serde(alias = "fechaCompra")]
    pub purchase_date: String,

    #[serde(alias = "montoCompra")]
    pub purchase_amount: f64,

    #[serde(default, alias = "ofertas")]
    pub offers: Vec<PurchaseOffer>,
}

impl Purchase {
    /// Longest term this purchase offers for the given type.
    ///
    /// Only this purchase's own offers are considered.
    pub fn max_term(&self, offer_type: OfferType) -> Option<Term> {
        self.offers
            .iter()
            .filter(|offer| offer.offer_type == offer_type)
            .filter_map(PurchaseOffer::term)
            .max()
    }
}

// =============================================================================
// Deferred Purchase (history)
// =============================================================================

/// A purchase that was already converted into an installment plan.
///
/// Read-only history; never classified or simulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeferredPurchase {
    pub id: PurchaseId,

    #[serde(alias = "nomCom")]
    pub merchant_name: String,

    #[serde(alias = "fechaModificacion")]
    pub modified_date: String,

    #[serde(alias = "montoCompra")]
    pub purchase_amount: f64,

    #[serde(default, alias = "ofertas")]
    pub offers: Vec<PurchaseOffer>,
}

/// One label/value line of the history detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
}

impl DetailRow {
    fn new(label: &str, value: String) -> Self {
        DetailRow {
            label: label.to_string(),
            value,
        }
    }
}

impl DeferredPurchase {
    /// Amount shown in the history list: the first offer's total when it
    /// has one, otherwise the purchase amount.
    pub fn display_amount(&self) -> f64 {
        match self.offers.first().and_then(|offer| offer.total_due) {
            Some(total) if total != 0.0 => total,
            _ => self.purchase_amount,
        }
    }

    /// Detail rows for the first (active) offer.
    ///
    /// Rate rows only appear when the offer carries a monthly rate; the
    /// monthly payment row only when it carries a total.
    pub fn details(&self, currency: &str) -> Vec<DetailRow> {
        let Some(offer) = self.offers.first() else {
            return Vec::new();
        };

        let mut rows = vec![DetailRow::new(
            "Purchase amount",
            Money::from_amount(self.purchase_amount).with_currency(currency),
        )];

        if let Some(rate) = offer.monthly_rate.filter(|r| *r != 0.0) {
            rows.push(DetailRow::new(
                "Annual interest rate",
                format!("{}%", annual_rate_pct(rate)),
            ));
            rows.push(DetailRow::new(
                "Monthly interest rate",
                format!("{}%", monthly_rate_pct(rate)),
            ));
        }

        rows.push(DetailRow::new(
            "Term",
            format!("{} months", offer.term_months),
        ));

        if let (Some(total), Some(term)) = (offer.total_due.filter(|t| *t != 0.0), offer.term()) {
            rows.push(DetailRow::new(
                "Monthly payment",
                Money::from_amount(total / term.as_f64()).with_currency(currency),
            ));
        }

        rows
    }
}

// =============================================================================
// Terms and Conditions
// =============================================================================

/// Terms-and-conditions text shown before confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TermsText {
    pub description: String,
}

// =============================================================================
// Card Profile
// =============================================================================

/// Card shown on the confirmation and receipt views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CardProfile {
    pub name: String,
    pub number: String,
    #[serde(default, alias = "codStamp")]
    pub image_code: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCardProfile {
    name: Option<String>,
    number: Option<String>,
    #[serde(alias = "codStamp")]
    image_code: Option<String>,
}

impl CardProfile {
    /// Profile used when the session holds none.
    pub fn fallback() -> Self {
        CardProfile {
            name: "Tarjeta Rockstar".to_string(),
            number: "5038".to_string(),
            image_code: None,
        }
    }

    /// Builds a profile from the raw session value.
    ///
    /// Absent or unparseable values give [`CardProfile::fallback`]; a stored
    /// profile with empty fields is completed with the stored-card defaults.
    pub fn from_stored(raw: Option<&str>) -> Self {
        let Some(stored) = raw.and_then(|r| serde_json::from_str::<StoredCardProfile>(r).ok())
        else {
            return CardProfile::fallback();
        };

        CardProfile {
            name: stored
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "LikeU Red".to_string()),
            number: stored
                .number
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "*0942".to_string()),
            image_code: stored.image_code.filter(|c| !c.is_empty()),
        }
    }
}

// =============================================================================
// Dates
// =============================================================================

/// Parses a purchase date as delivered by the feed.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS[.fff]`, `YYYY-MM-DD HH:MM:SS`
/// and plain `YYYY-MM-DD`. Returns `None` for anything else.
pub fn parse_purchase_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(offer_type: OfferType, term: &str) -> PurchaseOffer {
        PurchaseOffer {
            id: 1,
            offer_type,
            term_months: term.to_string(),
            total_due: None,
            monthly_rate: None,
        }
    }

    #[test]
    fn test_term_parsing() {
        assert_eq!("12".parse::<Term>().unwrap(), Term::M12);
        assert_eq!(" 6 ".parse::<Term>().unwrap(), Term::M6);
        assert!("".parse::<Term>().is_err());
        assert!("0".parse::<Term>().is_err());
        assert!("six".parse::<Term>().is_err());
    }

    #[test]
    fn test_term_serializes_as_string() {
        let json = serde_json::to_string(&Term::M18).unwrap();
        assert_eq!(json, "\"18\"");

        let from_text: Term = serde_json::from_str("\"9\"").unwrap();
        let from_number: Term = serde_json::from_str("9").unwrap();
        assert_eq!(from_text, Term::M9);
        assert_eq!(from_number, Term::M9);
    }

    #[test]
    fn test_purchase_accepts_legacy_field_names() {
        let json = r#"{
            "id": 7,
            "nomCom": "LIVERPOOL",
            "fechaCompra": "2024-03-01",
            "montoCompra": 2500.5,
            "ofertas": [
                {"id": 70, "tipo": "MCI", "noMeses": "6", "totalPago": 2600.0, "interesMensual": 0.01},
                {"id": 71, "tipo": "MSI", "noMeses": "3", "totalPago": null, "interesMensual": null}
            ]
        }"#;
        let purchase: Purchase = serde_json::from_str(json).unwrap();
        assert_eq!(purchase.merchant_name, "LIVERPOOL");
        assert_eq!(purchase.offers.len(), 2);
        assert_eq!(purchase.offers[0].offer_type, OfferType::Mci);
        assert_eq!(purchase.offers[0].total_due, Some(2600.0));
        assert_eq!(purchase.offers[1].total_due, None);
    }

    #[test]
    fn test_max_term_is_per_purchase() {
        let purchase = Purchase {
            id: 1,
            merchant_name: "Store".to_string(),
            purchase_date: "2024-01-01".to_string(),
            purchase_amount: 100.0,
            offers: vec![
                offer(OfferType::Msi, "3"),
                offer(OfferType::Msi, "12"),
                offer(OfferType::Mci, "6"),
                offer(OfferType::Mci, "bogus"),
            ],
        };
        assert_eq!(purchase.max_term(OfferType::Msi), Some(Term::M12));
        assert_eq!(purchase.max_term(OfferType::Mci), Some(Term::M6));
    }

    #[test]
    fn test_deferred_display_amount() {
        let mut deferred = DeferredPurchase {
            id: 3,
            merchant_name: "Store".to_string(),
            modified_date: "2024-01-01".to_string(),
            purchase_amount: 900.0,
            offers: vec![],
        };
        assert_eq!(deferred.display_amount(), 900.0);

        let mut mci = offer(OfferType::Mci, "6");
        mci.total_due = Some(990.0);
        mci.monthly_rate = Some(0.0125);
        deferred.offers.push(mci);
        assert_eq!(deferred.display_amount(), 990.0);

        let rows = deferred.details("MXN");
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Purchase amount",
                "Annual interest rate",
                "Monthly interest rate",
                "Term",
                "Monthly payment"
            ]
        );
        assert_eq!(rows[1].value, "15.00%");
        assert_eq!(rows[4].value, "165.00 MXN");
    }

    #[test]
    fn test_card_profile_fallbacks() {
        assert_eq!(CardProfile::from_stored(None), CardProfile::fallback());
        assert_eq!(CardProfile::from_stored(Some("not json")), CardProfile::fallback());

        let partial = CardProfile::from_stored(Some(r#"{"codStamp": "642"}"#));
        assert_eq!(partial.name, "LikeU Red");
        assert_eq!(partial.number, "*0942");
        assert_eq!(partial.image_code.as_deref(), Some("642"));
    }

    #[test]
    fn test_parse_purchase_date_formats() {
        assert!(parse_purchase_date("2024-05-10").is_some());
        assert!(parse_purchase_date("2024-05-10T13:45:00").is_some());
        assert!(parse_purchase_date("2024-05-10T13:45:00Z").is_some());
        assert!(parse_purchase_date("2024-05-10 13:45:00").is_some());
        assert!(parse_purchase_date("10/05/2024").is_none());
        assert!(
            parse_purchase_date("2024-05-10T13:45:00").unwrap()
                > parse_purchase_date("2024-05-10").unwrap()
        );
    }
}
