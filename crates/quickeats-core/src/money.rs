//! # Money Module
//!
//! Provides the `Money` type for prices, modifier adjustments and order totals.
//!
//! ## Units at the Boundaries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE EACH UNIT LIVES                                                  │
//! │                                                                         │
//! │  Storefront JSON      12.99   (dollars, a JSON number)                  │
//! │        │                                                                │
//! │        ▼  Money::from_dollars  (rounded once, here)                     │
//! │  In memory            1299    (integer cents, exact arithmetic)         │
//! │        │                                                                │
//! │        ├──► Toast wire   12.99   (dollars)                              │
//! │        └──► Square wire  1299    (cents, `amount` field)                │
//! │                                                                         │
//! │  Floats only appear while crossing a boundary. All sums are integer.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quickeats_core::money::Money;
//!
//! let price = Money::from_dollars(10.99);
//! assert_eq!(price.cents(), 1099);
//!
//! let total = price + Money::from_cents(500);
//! assert_eq!(total.to_dollars(), 15.99);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents (USD).
///
/// Serializes as a dollar amount (`12.99`) because every caller of this
/// layer speaks dollars. Signed: modifier adjustments may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a dollar amount, rounding to the nearest cent.
    ///
    /// ## Example
    /// ```rust
    /// use quickeats_core::money::Money;
    ///
    /// assert_eq!(Money::from_dollars(0.1 + 0.2).cents(), 30);
    /// assert_eq!(Money::from_dollars(-1.5).cents(), -150);
    /// ```
    pub fn from_dollars(dollars: f64) -> Self {
        if !dollars.is_finite() {
            return Money::zero();
        }
        Money((dollars * 100.0).round() as i64)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value as a dollar amount (for wire formats only).
    #[inline]
    pub fn to_dollars(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_dollars())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dollars = f64::deserialize(deserializer)?;
        Ok(Money::from_dollars(dollars))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points. 825 bps = 8.25%.
///
/// Configs carry the rate as a fraction (`0.0825`); see [`TaxRate::from_fraction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage such as `8.25`.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return TaxRate(0);
        }
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Creates a tax rate from a fraction such as `0.08`.
    ///
    /// `None` unless `0.0 <= fraction <= 1.0`.
    ///
    /// ## Example
    /// ```rust
    /// use quickeats_core::money::TaxRate;
    ///
    /// assert_eq!(TaxRate::from_fraction(0.0825).map(|r| r.bps()), Some(825));
    /// assert_eq!(TaxRate::from_fraction(8.0), None);
    /// ```
    pub fn from_fraction(fraction: f64) -> Option<Self> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return None;
        }
        Some(TaxRate::from_percentage(fraction * 100.0))
    }

    /// Derives the effective rate from a tax amount and the subtotal it was
    /// charged on. Zero when the subtotal is not positive.
    pub fn effective(tax: Money, subtotal: Money) -> Self {
        if !subtotal.is_positive() || tax.is_negative() {
            return TaxRate(0);
        }
        let bps = (tax.cents() as i128 * 10000 + subtotal.cents() as i128 / 2) / subtotal.cents() as i128;
        TaxRate(bps.clamp(0, u32::MAX as i128) as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the rate as a fraction, e.g. `0.0825`.
    pub fn fraction(&self) -> f64 {
        self.0 as f64 / 10000.0
    }

    /// Returns the rate as a percentage string, e.g. `"8.25"`.
    ///
    /// Square expects tax percentages as decimal strings.
    pub fn percentage_string(&self) -> String {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            whole.to_string()
        } else if frac % 10 == 0 {
            format!("{}.{}", whole, frac / 10)
        } else {
            format!("{}.{:02}", whole, frac)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
