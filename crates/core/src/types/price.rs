//! Type-safe price representation using decimal arithmetic.
//!
//! The store sells in Chilean pesos, which have no minor unit in practice.
//! Amounts are kept as [`Decimal`] so the backend's numeric costs survive
//! without float rounding, and are displayed the es-CL way: `$12.990`.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::fmt::group_thousands;

/// A price in Chilean pesos (CLP).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of pesos.
    #[must_use]
    pub fn from_pesos(pesos: i64) -> Self {
        Self(Decimal::from(pesos))
    }

    /// The amount in pesos.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display, rounded to whole pesos (e.g., `$12.990`).
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .abs()
            .trunc();
        let sign = if self.0.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}${}", group_thousands(&rounded.to_string()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl core::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| acc + p)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::from_pesos(12_990).display(), "$12.990");
        assert_eq!(Price::from_pesos(1_250_000).display(), "$1.250.000");
        assert_eq!(Price::from_pesos(500).display(), "$500");
        assert_eq!(Price::ZERO.display(), "$0");
    }

    #[test]
    fn test_display_rounds_to_whole_pesos() {
        let price = Price::new(Decimal::new(99_995, 1)); // 9999.5
        assert_eq!(price.display(), "$10.000");
    }

    #[test]
    fn test_times_and_sum() {
        let line = Price::from_pesos(4_500).times(3);
        assert_eq!(line, Price::from_pesos(13_500));

        let total: Price = [Price::from_pesos(1_000), Price::from_pesos(2_500)]
            .into_iter()
            .sum();
        assert_eq!(total.display(), "$3.500");
    }

    #[test]
    fn test_deserializes_from_json_number() {
        let price: Price = serde_json::from_str("15990").unwrap();
        assert_eq!(price, Price::from_pesos(15_990));

        let price: Price = serde_json::from_str("15990.0").unwrap();
        assert_eq!(price.display(), "$15.990");
    }

    #[test]
    fn test_serializes_as_json_number() {
        let json = serde_json::to_string(&Price::from_pesos(2_000)).unwrap();
        assert_eq!(json, "2000.0");
    }
}
