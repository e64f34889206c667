//! # Display Formatting
//!
//! Rounding of engine results for display.
//!
//! ## Where Rounding Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The engine computes in f64 end to end:                                 │
//! │                                                                         │
//! │    total = base × (1 + rate × months)     (no rounding)                 │
//! │    monthly = total / months               (no rounding)                 │
//! │                                                                         │
//! │  Rounding happens ONCE, here, when a value leaves for a view:           │
//! │                                                                         │
//! │    Money::from_amount(1192.0 / 24.0)  → 49.67                           │
//! │    annual_rate_pct(0.008)             → "9.60"                          │
//! │                                                                         │
//! │  Rounded values are never fed back into the engine.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Money
// =============================================================================

/// A display amount in cents (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: refunds and adjustments may be negative
/// - **Built from f64 once**: `from_amount` rounds half away from zero to
///   the nearest cent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Rounds an engine amount to the nearest cent.
    ///
    /// ## Example
    /// ```rust
    /// use deferral_core::format::Money;
    ///
    /// assert_eq!(Money::from_amount(1050.0).cents(), 105000);
    /// assert_eq!(Money::from_amount(49.666_666).cents(), 4967);
    /// ```
    pub fn from_amount(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        Money((amount * 100.0).round() as i64)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (sign preserved).
    #[inline]
    pub const fn whole(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Formats with a trailing currency code: `"1,050.00 MXN"`.
    pub fn with_currency(&self, currency: &str) -> String {
        if currency.is_empty() {
            return self.to_string();
        }
        format!("{} {}", self, currency)
    }
}

/// Grouped thousands, two decimals: `1,234,567.89`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.whole().abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        write!(f, "{}{}.{:02}", sign, grouped, self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Rates
// =============================================================================

/// Monthly rate as a two-decimal percentage: `0.008` → `"0.80"`.
pub fn monthly_rate_pct(monthly_rate: f64) -> String {
    format!("{:.2}", monthly_rate * 100.0)
}

/// Annualized (simple, ×12) rate as a two-decimal percentage:
/// `0.008` → `"9.60"`.
pub fn annual_rate_pct(monthly_rate: f64) -> String {
    format!("{:.2}", monthly_rate * 1200.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_amount_rounds_to_cents() {
        assert_eq!(Money::from_amount(175.0).cents(), 17500);
        assert_eq!(Money::from_amount(49.666).cents(), 4967);
        assert_eq!(Money::from_amount(-5.5).cents(), -550);
        assert_eq!(Money::from_amount(f64::NAN).cents(), 0);
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_amount(1050.0).to_string(), "1,050.00");
        assert_eq!(Money::from_amount(0.99).to_string(), "0.99");
        assert_eq!(Money::from_amount(1_234_567.89).to_string(), "1,234,567.89");
        assert_eq!(Money::from_amount(-550.5).to_string(), "-550.50");
        assert_eq!(Money::from_amount(1000.0).with_currency("MXN"), "1,000.00 MXN");
        assert_eq!(Money::from_amount(1000.0).with_currency(""), "1,000.00");
    }

    #[test]
    fn test_rate_percentages() {
        assert_eq!(monthly_rate_pct(0.008), "0.80");
        assert_eq!(annual_rate_pct(0.008), "9.60");
        assert_eq!(annual_rate_pct(0.0), "0.00");
        assert_eq!(monthly_rate_pct(0.0125), "1.25");
    }
}
