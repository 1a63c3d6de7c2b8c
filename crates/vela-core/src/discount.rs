//! # Discount Model
//!
//! A discount is a single tagged value: either a percentage or an absolute
//! amount, never both at once. The authoritative representation is the tag;
//! the other figure is derived against a base whenever it is needed for
//! display or arithmetic.
//!
//! ## Why a Tagged Value?
//! Storing a percentage field and an amount field side by side invites them
//! to drift apart when only one is updated. Here the tag is the single
//! source of truth and [`Discount::breakdown`] derives both figures in one
//! place, so line-level and order-level discounts cannot disagree on the
//! conversion math.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, BPS_SCALE};

/// A discount applied to a line or to the whole order.
///
/// Percentages are basis points (1000 = 10%); amounts are cents.
/// Values are stored as entered and clamped at computation time, so a
/// fixed amount that temporarily exceeds a shrunken base is honored again
/// if the base grows back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
#[ts(export)]
pub enum Discount {
    /// No discount active.
    #[default]
    None,
    /// Percentage of the base, in basis points.
    Percent(u32),
    /// Absolute amount in cents.
    Amount(i64),
}

/// Both representations of a discount, derived against a concrete base.
///
/// Persisted alongside the tag so the UI can show either figure without
/// re-deriving it, and so order records carry the numbers that were
/// actually charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountBreakdown {
    /// Effective percentage in basis points, clamped to [0, 10000].
    pub percent_bps: u32,
    /// Effective amount in cents, clamped to [0, base].
    pub amount_cents: i64,
}

impl Discount {
    /// Checks whether any discount is active.
    #[inline]
    pub const fn is_none(&self) -> bool {
        matches!(self, Discount::None)
    }

    /// Derives both representations against `base`.
    ///
    /// ## Clamping
    /// - A percentage above 100% is treated as exactly 100%.
    /// - An amount above the base is treated as exactly the base.
    /// - Negative amounts are treated as zero.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::discount::Discount;
    /// use vela_core::money::Money;
    ///
    /// let base = Money::from_cents(7500);
    ///
    /// let bd = Discount::Percent(1000).breakdown(base);
    /// assert_eq!(bd.amount_cents, 750);
    /// assert_eq!(bd.percent_bps, 1000);
    ///
    /// let bd = Discount::Amount(9_999).breakdown(base);
    /// assert_eq!(bd.amount_cents, 7500); // clamped to the base
    /// ```
    pub fn breakdown(&self, base: Money) -> DiscountBreakdown {
        match *self {
            Discount::None => DiscountBreakdown::default(),
            Discount::Percent(bps) => {
                let bps = bps.min(BPS_SCALE);
                DiscountBreakdown {
                    percent_bps: bps,
                    amount_cents: base.percent_of(bps).cents(),
                }
            }
            Discount::Amount(cents) => {
                let amount = Money::from_cents(cents.max(0)).min(base.floor_zero());
                DiscountBreakdown {
                    percent_bps: amount.ratio_bps(base),
                    amount_cents: amount.cents(),
                }
            }
        }
    }

    /// The effective discount amount against `base`, clamped.
    #[inline]
    pub fn amount_against(&self, base: Money) -> Money {
        Money::from_cents(self.breakdown(base).amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
