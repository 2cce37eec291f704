//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Vietnamese đồng has no minor unit in circulation.                      │
//! │                                                                         │
//! │    199 999 ₫ + 25 000 ₫ shipping = 224 999 ₫                            │
//! │                                                                         │
//! │  Every price, tax, discount and total is an exact i64 count of đồng.   │
//! │  Floats never touch an amount; they only appear in display code.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopfront_core::money::Money;
//!
//! let price = Money::from_dong(100_000);
//! let line = price * 2;
//! assert_eq!(line.dong(), 200_000);
//! assert_eq!(line.to_string(), "200.000 ₫");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in Vietnamese đồng.
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts and refunds can be represented as negatives
/// - **Saturating arithmetic**: sums over server data clamp at the `i64`
///   bounds instead of panicking
/// - **Newtype serde**: serialises as a bare JSON number, matching the
///   backend's `price`/`totalAmount` fields
///
/// ## Where Money is Used
/// ```text
/// CartLine.unit_price ──► OrderLine.unit_price ──► Order.total_amount
///                                  │
///                                  └──► InvoiceProduct.unit_price ──► Financials
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from a whole number of đồng.
    ///
    /// ## Example
    /// ```rust
    /// use shopfront_core::money::Money;
    ///
    /// let price = Money::from_dong(25_000);
    /// assert_eq!(price.dong(), 25_000);
    /// ```
    #[inline]
    pub const fn from_dong(dong: i64) -> Self {
        Money(dong)
    }

    /// Returns the value in đồng.
    #[inline]
    pub const fn dong(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use shopfront_core::money::Money;
    ///
    /// let unit_price = Money::from_dong(149_000);
    /// assert_eq!(unit_price.multiply_quantity(3).dong(), 447_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Vietnamese formatting: dot as thousands separator, `₫` suffix.
///
/// ## Note
/// The SPAs format with `Intl.NumberFormat("vi-VN")`; this mirrors it for
/// exported documents and CLI output.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{} ₫", sign, grouped)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dong() {
        let money = Money::from_dong(224_999);
        assert_eq!(money.dong(), 224_999);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_dong(0).to_string(), "0 ₫");
        assert_eq!(Money::from_dong(999).to_string(), "999 ₫");
        assert_eq!(Money::from_dong(25_000).to_string(), "25.000 ₫");
        assert_eq!(Money::from_dong(1_234_567).to_string(), "1.234.567 ₫");
        assert_eq!(Money::from_dong(-200_000).to_string(), "-200.000 ₫");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_dong(100_000);
        let b = Money::from_dong(25_000);

        assert_eq!((a + b).dong(), 125_000);
        assert_eq!((a - b).dong(), 75_000);
        assert_eq!((a * 3).dong(), 300_000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::from_dong(i64::MAX);
        assert_eq!(max + Money::from_dong(1), max);
        assert_eq!(max * 2, max);
        assert_eq!(max.multiply_quantity(999), max);
        assert_eq!(Money::from_dong(i64::MIN) - Money::from_dong(1), Money::from_dong(i64::MIN));

        let mut total = max;
        total += Money::from_dong(10);
        assert_eq!(total, max);
    }

    #[test]
    fn test_sum() {
        let amounts = vec![Money::from_dong(1), Money::from_dong(2), Money::from_dong(3)];
        let by_ref: Money = amounts.iter().sum();
        let by_value: Money = amounts.into_iter().sum();
        assert_eq!(by_ref, Money::from_dong(6));
        assert_eq!(by_value, Money::from_dong(6));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Money::from_dong(150_000)).unwrap();
        assert_eq!(json, "150000");
        let back: Money = serde_json::from_str("150000").unwrap();
        assert_eq!(back, Money::from_dong(150_000));
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_dong(1).is_positive());
        assert!(Money::from_dong(-1).is_negative());
    }
}
