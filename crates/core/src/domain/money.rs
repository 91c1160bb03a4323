//! Whole-unit monetary amounts.
//!
//! Budget prices are exact integers in the catalog's currency unit. `Money` keeps
//! them in an `i64` so sums are order independent and never pick up floating
//! point drift. Arithmetic saturates at the `i64` bounds instead of
//! overflowing; catalogs are held to [`Money::MAX_CATALOG_AMOUNT`] so real
//! budgets never get near them.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);
    /// Largest magnitude a single catalog price may carry.
    pub const MAX_CATALOG_AMOUNT: i64 = 1_000_000_000;

    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn within_catalog_bounds(self) -> bool {
        self.0 >= -Self::MAX_CATALOG_AMOUNT && self.0 <= Self::MAX_CATALOG_AMOUNT
    }

    /// Share of this amount for a whole-number percentage, rounded half away from zero.
    pub fn percentage(self, pct: u8) -> Self {
        let share = Decimal::from(self.0) * Decimal::from(pct) / Decimal::ONE_HUNDRED;
        let rounded = share.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        // Shares of at most 100% always fit back into an i64.
        Self(rounded.to_i64().unwrap_or_default())
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Self(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::Money;

    #[test]
    fn sums_are_exact_and_order_independent() {
        let forward: Money = [150, -300, 20, 5].into_iter().map(Money::new).sum();
        let backward: Money = [5, 20, -300, 150].into_iter().map(Money::new).sum();

        assert_eq!(forward, Money::new(-125));
        assert_eq!(forward, backward);
    }

    #[test]
    fn percentage_rounds_half_away_from_zero() {
        assert_eq!(Money::new(1850).percentage(50), Money::new(925));
        assert_eq!(Money::new(1855).percentage(30), Money::new(557));
        assert_eq!(Money::new(1).percentage(50), Money::new(1));
        assert_eq!(Money::new(-1).percentage(50), Money::new(-1));
        assert_eq!(Money::new(2000).percentage(0), Money::ZERO);
    }

    #[test]
    fn extreme_values_saturate_instead_of_overflowing() {
        assert_eq!(Money::new(i64::MIN).abs(), Money::new(i64::MAX));
        assert_eq!(-Money::new(i64::MIN), Money::new(i64::MAX));
        assert_eq!(Money::new(i64::MAX) + Money::new(1), Money::new(i64::MAX));
        assert_eq!(Money::new(i64::MIN) - Money::new(1), Money::new(i64::MIN));

        let total: Money = [i64::MAX, i64::MAX].into_iter().map(Money::new).sum();
        assert_eq!(total, Money::new(i64::MAX));
    }

    #[test]
    fn catalog_bounds_are_symmetric() {
        assert!(Money::new(Money::MAX_CATALOG_AMOUNT).within_catalog_bounds());
        assert!(Money::new(-Money::MAX_CATALOG_AMOUNT).within_catalog_bounds());
        assert!(!Money::new(Money::MAX_CATALOG_AMOUNT + 1).within_catalog_bounds());
        assert!(!Money::new(i64::MIN).within_catalog_bounds());
    }

    #[test]
    fn serializes_as_a_bare_integer() {
        let json = serde_json::to_string(&Money::new(-300)).expect("serialize");
        assert_eq!(json, "-300");
        let parsed: Money = serde_json::from_str("150").expect("deserialize");
        assert_eq!(parsed, Money::new(150));
    }
}
