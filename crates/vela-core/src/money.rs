//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many retail systems:                                                │
//! │    $10.00 / 3 = $3.33 (×3 = $9.99)  → Lost $0.01!                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    All subtotals and totals are stored in cents, so the two-decimal    │
//! │    rounding rule holds by construction. The only rounding points are   │
//! │    percentage application and per-unit splits, both round-half-up.     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vela_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(2500); // $25.00
//!
//! // Arithmetic operations
//! let line = price * 3i64;                     // $75.00
//! let discount = line.percent_of(1000);        // 10% => $7.50
//! assert_eq!((line - discount).cents(), 6750);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// One hundred percent, expressed in basis points.
pub const BPS_SCALE: u32 = 10_000;

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate arithmetic may dip below zero before clamping
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
///
/// Every monetary value in the cart flows through this type: unit prices,
/// manual adjustments, discount amounts, line subtotals and order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
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

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // $8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a percentage (in basis points) and returns the resulting amount.
    ///
    /// Rounding is half-up: `(cents × bps + 5000) / 10000`, computed in i128
    /// to prevent overflow on large amounts.
    ///
    /// ## Arguments
    /// * `bps` - Percentage in basis points (1000 = 10%)
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(12500); // $125.00
    /// assert_eq!(subtotal.percent_of(1000).cents(), 1250); // 10% => $12.50
    ///
    /// // Half-up at the boundary: 8.25% of $10.00 = $0.825 => $0.83
    /// assert_eq!(Money::from_cents(1000).percent_of(825).cents(), 83);
    /// ```
    pub fn percent_of(&self, bps: u32) -> Money {
        let amount = (self.0 as i128 * bps as i128 + 5000) / 10_000;
        Money::from_cents(amount as i64)
    }

    /// Expresses this amount as a fraction of `base`, in basis points.
    ///
    /// This is the inverse of [`Money::percent_of`]: converting a percentage
    /// to an amount and back reproduces the original percentage within
    /// rounding tolerance. Result is clamped to `[0, 10000]`; a zero or
    /// negative base yields 0.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    ///
    /// let base = Money::from_cents(7500);
    /// let amount = Money::from_cents(750);
    /// assert_eq!(amount.ratio_bps(base), 1000); // 10%
    /// ```
    pub fn ratio_bps(&self, base: Money) -> u32 {
        if base.0 <= 0 || self.0 <= 0 {
            return 0;
        }
        let bps = (self.0 as i128 * BPS_SCALE as i128 + base.0 as i128 / 2) / base.0 as i128;
        bps.min(BPS_SCALE as i128) as u32
    }

    /// Splits this amount evenly across `quantity` units, rounding half-up.
    ///
    /// Used to derive the per-unit share of a flat line-level adjustment.
    /// The caller guarantees `quantity > 0`.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    ///
    /// // $5.00 across 3 units: 166.67 cents => 167 cents per unit
    /// let per_unit = Money::from_cents(500).split_per_unit(3);
    /// assert_eq!(per_unit.cents(), 167);
    /// ```
    pub fn split_per_unit(&self, quantity: i64) -> Money {
        debug_assert!(quantity > 0);
        Money::from_cents((self.0 + quantity / 2) / quantity)
    }

    /// Clamps a negative value up to zero.
    ///
    /// Totals are floored at zero after discount subtraction.
    #[inline]
    pub fn floor_zero(&self) -> Money {
        Money(self.0.max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and log output. Use frontend formatting for actual
/// UI display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
