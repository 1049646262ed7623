use super::courier::CourierId;
use super::money::Money;
use super::motorcycle::MotorcycleId;
use super::pricing::Plan;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RentalId(pub u32);

impl fmt::Display for RentalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RentalStatus {
    Active,
    Completed,
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("Active"),
            Self::Completed => f.write_str("Completed"),
        }
    }
}

/// A motorcycle rental, from opening to settlement.
///
/// Created `Active` and completed exactly once. A completed rental is a
/// historical record and is never modified again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rental {
    pub id: RentalId,
    pub courier_id: CourierId,
    pub motorcycle_id: MotorcycleId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub expected_end_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub plan: Plan,
    /// Rate captured when the rental was opened.
    pub daily_rate: Money,
    pub total_amount: Money,
    pub fine_amount: Option<Money>,
    pub additional_amount: Option<Money>,
    pub status: RentalStatus,
}

impl Rental {
    pub fn is_active(&self) -> bool {
        self.status == RentalStatus::Active
    }

    /// Returns the completed version of this rental carrying the settlement.
    pub fn settled(&self, settlement: &Settlement) -> Rental {
        Rental {
            return_date: Some(settlement.return_date),
            total_amount: settlement.total_amount,
            fine_amount: Some(settlement.fine_amount),
            additional_amount: Some(settlement.additional_amount),
            status: RentalStatus::Completed,
            ..self.clone()
        }
    }
}

/// What the caller gets back after opening a rental.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RentalSummary {
    pub id: RentalId,
    pub courier_id: CourierId,
    pub motorcycle_id: MotorcycleId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub expected_end_date: NaiveDate,
    pub plan_days: u32,
    pub daily_rate: Money,
    pub total_amount: Money,
    pub status: RentalStatus,
}

impl From<&Rental> for RentalSummary {
    fn from(rental: &Rental) -> Self {
        Self {
            id: rental.id,
            courier_id: rental.courier_id,
            motorcycle_id: rental.motorcycle_id,
            start_date: rental.start_date,
            end_date: rental.end_date,
            expected_end_date: rental.expected_end_date,
            plan_days: rental.plan.days(),
            daily_rate: rental.daily_rate,
            total_amount: rental.total_amount,
            status: rental.status,
        }
    }
}

/// Final amounts of a returned rental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub rental_id: RentalId,
    pub return_date: NaiveDate,
    /// Daily rate times the days actually used.
    pub base_amount: Money,
    pub fine_amount: Money,
    pub additional_amount: Money,
    /// Base plus fine plus additional amount.
    pub total_amount: Money,
}
