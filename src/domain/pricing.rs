//! Fixed rental plans and their rates.
//!
//! Every plan duration maps to a daily rate and to the share of the unused
//! days charged as a fine on early return. Any other duration is rejected
//! with [`PricingError::InvalidPlan`].

use super::money::{Money, Percentage};
use crate::error::PricingError;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rental plan, identified by its length in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Plan {
    Days7,
    Days15,
    Days30,
    Days45,
    Days50,
}

impl Plan {
    pub const ALL: [Plan; 5] = [
        Plan::Days7,
        Plan::Days15,
        Plan::Days30,
        Plan::Days45,
        Plan::Days50,
    ];

    pub fn days(&self) -> u32 {
        match self {
            Self::Days7 => 7,
            Self::Days15 => 15,
            Self::Days30 => 30,
            Self::Days45 => 45,
            Self::Days50 => 50,
        }
    }

    pub fn daily_rate(&self) -> Money {
        match self {
            Self::Days7 => Money::new(dec!(30.00)),
            Self::Days15 => Money::new(dec!(28.00)),
            Self::Days30 => Money::new(dec!(22.00)),
            Self::Days45 => Money::new(dec!(20.00)),
            Self::Days50 => Money::new(dec!(18.00)),
        }
    }

    /// Share of the unused days charged when the motorcycle comes back early.
    pub fn fine_percentage(&self) -> Percentage {
        match self {
            Self::Days7 => Percentage::from_points(20),
            Self::Days15 => Percentage::from_points(40),
            Self::Days30 | Self::Days45 | Self::Days50 => Percentage::ZERO,
        }
    }
}

impl TryFrom<u32> for Plan {
    type Error = PricingError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            7 => Ok(Self::Days7),
            15 => Ok(Self::Days15),
            30 => Ok(Self::Days30),
            45 => Ok(Self::Days45),
            50 => Ok(Self::Days50),
            other => Err(PricingError::InvalidPlan(other)),
        }
    }
}

impl From<Plan> for u32 {
    fn from(plan: Plan) -> Self {
        plan.days()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.days())
    }
}

pub fn daily_rate(plan_days: u32) -> Result<Money, PricingError> {
    Plan::try_from(plan_days).map(|plan| plan.daily_rate())
}

pub fn fine_percentage(plan_days: u32) -> Result<Percentage, PricingError> {
    Plan::try_from(plan_days).map(|plan| plan.fine_percentage())
}
