//! # Validation Module
//!
//! Input validation for values that cross into the engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Data source (deserialization)                                 │
//! │  ├── Shape checks (serde)                                               │
//! │  └── Null totals/rates → 0.0 at classification, never an error          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Term chosen by the user in the simulator                           │
//! │  └── Sanity checks on loaded purchases (reported, not fatal)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::model::{Purchase, Term};
use crate::SIMULATOR_TERMS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Parses a term chosen in the simulator and checks it is offered there.
///
/// ## Example
/// ```rust
/// use deferral_core::validation::validate_simulator_term;
/// use deferral_core::Term;
///
/// assert_eq!(validate_simulator_term("18").unwrap(), Term::M18);
/// assert!(validate_simulator_term("3").is_err());
/// assert!(validate_simulator_term("abc").is_err());
/// ```
pub fn validate_simulator_term(raw: &str) -> ValidationResult<Term> {
    let term: Term = raw.parse()?;

    if !SIMULATOR_TERMS.contains(&term) {
        return Err(ValidationError::NotAllowed {
            field: "termMonths".to_string(),
            allowed: SIMULATOR_TERMS.iter().map(Term::to_string).collect(),
        });
    }

    Ok(term)
}

/// Checks a loaded purchase for values the engine cannot present sensibly.
///
/// ## Rules
/// - Merchant name must not be blank
/// - Purchase amount must not be negative
/// - Offer totals, when present, must not be negative
pub fn validate_purchase(purchase: &Purchase) -> ValidationResult<()> {
    if purchase.merchant_name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "merchantName".to_string(),
        });
    }

    if purchase.purchase_amount < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "purchaseAmount".to_string(),
        });
    }

    if purchase
        .offers
        .iter()
        .any(|offer| offer.total_due.is_some_and(|total| total < 0.0))
    {
        return Err(ValidationError::MustBeNonNegative {
            field: "totalDue".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OfferType, PurchaseOffer};

    fn purchase(name: &str, amount: f64) -> Purchase {
        Purchase {
            id: 1,
            merchant_name: name.to_string(),
            purchase_date: "2024-01-01".to_string(),
            purchase_amount: amount,
            offers: vec![],
        }
    }

    #[test]
    fn test_validate_simulator_term() {
        for raw in ["6", "9", "12", "18", "24"] {
            assert!(validate_simulator_term(raw).is_ok());
        }

        assert!(matches!(
            validate_simulator_term("3"),
            Err(ValidationError::NotAllowed { .. })
        ));
        assert!(matches!(
            validate_simulator_term(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_simulator_term("x"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_purchase() {
        assert!(validate_purchase(&purchase("Store", 10.0)).is_ok());
        assert!(validate_purchase(&purchase("Store", 0.0)).is_ok());
        assert!(validate_purchase(&purchase("  ", 10.0)).is_err());
        assert!(validate_purchase(&purchase("Store", -1.0)).is_err());

        let mut bad_offer = purchase("Store", 10.0);
        bad_offer.offers.push(PurchaseOffer {
            id: 1,
            offer_type: OfferType::Mci,
            term_months: "6".to_string(),
            total_due: Some(-5.0),
            monthly_rate: Some(0.01),
        });
        assert!(validate_purchase(&bad_offer).is_err());
    }
}
