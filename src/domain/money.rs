use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Number of decimal places every monetary value is kept at.
pub const MONEY_SCALE: u32 = 2;

/// Represents a monetary value with 2 decimal places precision.
///
/// This is a wrapper around `rust_decimal::Decimal` that pins the scale, so
/// amounts compare, add and print consistently (`0` is always `0.00`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(dec!(0.00));

    pub fn new(value: Decimal) -> Self {
        let mut value = value;
        value.rescale(MONEY_SCALE);
        Self(value)
    }

    /// Wraps a value that already carries two decimal places.
    pub const fn from_scaled(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Multiplies by a whole number of days.
    pub fn times(self, days: i64) -> Self {
        Self::new(self.0 * Decimal::from(days))
    }

    /// Applies a percentage to this amount.
    pub fn percent(self, percentage: Percentage) -> Self {
        Self::new(self.0 * percentage.fraction())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self::new)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A fraction applied to a monetary amount, `0.20` meaning 20%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
pub struct Percentage(Decimal);

impl Percentage {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Builds a percentage from whole points, `from_points(20)` being 20%.
    pub fn from_points(points: u32) -> Self {
        Self(Decimal::from(points) / dec!(100))
    }

    pub fn fraction(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", (self.0 * dec!(100)).normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_keeps_two_decimals() {
        assert_eq!(Money::ZERO.to_string(), "0.00");
        assert_eq!(Money::new(dec!(12.0000)).to_string(), "12.00");
        assert_eq!(Money::new(dec!(30)).times(7).to_string(), "210.00");
    }

    #[test]
    fn test_money_arithmetic() {
        let mut total = Money::new(dec!(10.5));
        total += Money::new(dec!(4.5));
        assert_eq!(total, Money::new(dec!(15.00)));
        assert_eq!(total + Money::ZERO, total);
    }

    #[test]
    fn test_percentage_application() {
        let unused = Money::new(dec!(60.00));
        assert_eq!(unused.percent(Percentage::from_points(20)), Money::new(dec!(12.00)));
        assert_eq!(unused.percent(Percentage::ZERO), Money::ZERO);
        assert_eq!(Percentage::from_points(40).to_string(), "40%");
    }

    #[test]
    fn test_money_deserializes_rescaled() {
        let money: Money = serde_json::from_str("\"7.5\"").unwrap();
        assert_eq!(money.to_string(), "7.50");
    }
}
