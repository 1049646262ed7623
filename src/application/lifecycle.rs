use crate::domain::calculator;
use crate::domain::courier::CourierId;
use crate::domain::eligibility;
use crate::domain::motorcycle::MotorcycleId;
use crate::domain::ports::{SharedClock, SharedRecordStore, Write};
use crate::domain::pricing::Plan;
use crate::domain::rental::{Rental, RentalId, RentalStatus, RentalSummary, Settlement};
use crate::error::{CompleteError, OpenError, StorageError};
use chrono::{Days, NaiveDate};
use tracing::{debug, info};

/// Default number of read-compute-commit cycles before giving up on contention.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// A request to open a rental.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenRental {
    pub rental_id: RentalId,
    pub courier_id: CourierId,
    pub motorcycle_id: MotorcycleId,
    pub plan_days: u32,
}

/// Outcome of a single read-compute-commit cycle.
enum Attempt<T> {
    Committed(T),
    Contended(StorageError),
}

/// The rental lifecycle: opens and completes rentals.
///
/// Every operation reads the records it needs, computes the new state without
/// side effects, and commits the paired rental and motorcycle writes in one
/// atomic batch. A batch rejected by a storage guard is retried from a fresh
/// read, up to `max_attempts` times.
pub struct RentalEngine {
    store: SharedRecordStore,
    clock: SharedClock,
    max_attempts: u32,
}

impl RentalEngine {
    /// Creates a new `RentalEngine`.
    ///
    /// # Arguments
    ///
    /// * `store` - The record store holding couriers, motorcycles and rentals.
    /// * `clock` - Source of today's date for new rentals.
    pub fn new(store: SharedRecordStore, clock: SharedClock) -> Self {
        Self {
            store,
            clock,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets how many times a contended commit is attempted. Values below 1 are raised to 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Opens a rental starting tomorrow for the requested plan.
    pub async fn open_rental(&self, request: OpenRental) -> Result<RentalSummary, OpenError> {
        let plan = Plan::try_from(request.plan_days)?;

        let mut attempt = 1;
        loop {
            match self.try_open(&request, plan).await? {
                Attempt::Committed(value) => return Ok(value),
                Attempt::Contended(err) if attempt < self.max_attempts => {
                    debug!(rental = %request.rental_id, attempt, error = %err, "retrying open");
                    attempt += 1;
                }
                Attempt::Contended(err) => return Err(err.into()),
            }
        }
    }

    async fn try_open(
        &self,
        request: &OpenRental,
        plan: Plan,
    ) -> Result<Attempt<RentalSummary>, OpenError> {
        let motorcycle = self.store.find_motorcycle(request.motorcycle_id).await?;
        let courier = self.store.find_courier(request.courier_id).await?;
        eligibility::can_open(courier.as_ref(), motorcycle.as_ref())?;

        if self.store.find_rental(request.rental_id).await?.is_some() {
            return Err(OpenError::RentalAlreadyExists(request.rental_id));
        }

        let rental = new_rental(request, plan, self.clock.today())?;
        let writes = vec![
            Write::InsertRental(rental.clone()),
            Write::SetAvailability {
                motorcycle: rental.motorcycle_id,
                expected: true,
                available: false,
            },
        ];

        match self.store.apply_all(writes).await {
            Ok(()) => {
                info!(
                    rental = %rental.id,
                    courier = %rental.courier_id,
                    motorcycle = %rental.motorcycle_id,
                    plan_days = rental.plan.days(),
                    total = %rental.total_amount,
                    "rental opened"
                );
                Ok(Attempt::Committed(RentalSummary::from(&rental)))
            }
            Err(err @ StorageError::Conflict(_)) => Ok(Attempt::Contended(err)),
            Err(err) => Err(err.into()),
        }
    }

    /// Settles an active rental returned on `return_date`.
    pub async fn complete_rental(
        &self,
        rental_id: RentalId,
        return_date: NaiveDate,
    ) -> Result<Settlement, CompleteError> {
        let mut attempt = 1;
        loop {
            match self.try_complete(rental_id, return_date).await? {
                Attempt::Committed(value) => return Ok(value),
                Attempt::Contended(err) if attempt < self.max_attempts => {
                    debug!(rental = %rental_id, attempt, error = %err, "retrying completion");
                    attempt += 1;
                }
                Attempt::Contended(err) => return Err(err.into()),
            }
        }
    }

    async fn try_complete(
        &self,
        rental_id: RentalId,
        return_date: NaiveDate,
    ) -> Result<Attempt<Settlement>, CompleteError> {
        let rental = self
            .store
            .find_rental(rental_id)
            .await?
            .ok_or(CompleteError::RentalNotFound)?;
        if !rental.is_active() {
            return Err(CompleteError::RentalNotActive);
        }
        if return_date < rental.start_date {
            return Err(CompleteError::ReturnDateBeforeStart);
        }

        let settlement = calculator::final_settlement(&rental, return_date);
        let writes = vec![
            Write::UpdateRental {
                rental: rental.settled(&settlement),
                expected: RentalStatus::Active,
            },
            Write::SetAvailability {
                motorcycle: rental.motorcycle_id,
                expected: false,
                available: true,
            },
        ];

        match self.store.apply_all(writes).await {
            Ok(()) => {
                info!(
                    rental = %rental_id,
                    motorcycle = %rental.motorcycle_id,
                    total = %settlement.total_amount,
                    fine = %settlement.fine_amount,
                    additional = %settlement.additional_amount,
                    "rental completed"
                );
                Ok(Attempt::Committed(settlement))
            }
            Err(err @ StorageError::Conflict(_)) => Ok(Attempt::Contended(err)),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn rental(&self, rental_id: RentalId) -> Result<Option<Rental>, StorageError> {
        self.store.find_rental(rental_id).await
    }

    /// All rentals, ordered by id.
    pub async fn rentals(&self) -> Result<Vec<Rental>, StorageError> {
        let mut rentals = self.store.rentals().await?;
        rentals.sort_by_key(|rental| rental.id);
        Ok(rentals)
    }

    pub async fn rentals_for_courier(
        &self,
        courier_id: CourierId,
    ) -> Result<Vec<Rental>, StorageError> {
        let mut rentals = self.rentals().await?;
        rentals.retain(|rental| rental.courier_id == courier_id);
        Ok(rentals)
    }
}

/// Builds the opening state of a rental requested on `today`.
///
/// The rental starts the day after the request and runs for the plan length.
fn new_rental(request: &OpenRental, plan: Plan, today: NaiveDate) -> Result<Rental, OpenError> {
    let start_date = today
        .checked_add_days(Days::new(1))
        .ok_or(OpenError::DateOutOfRange)?;
    let end_date = start_date
        .checked_add_days(Days::new(u64::from(plan.days())))
        .ok_or(OpenError::DateOutOfRange)?;

    Ok(Rental {
        id: request.rental_id,
        courier_id: request.courier_id,
        motorcycle_id: request.motorcycle_id,
        start_date,
        end_date,
        expected_end_date: end_date,
        return_date: None,
        plan,
        daily_rate: plan.daily_rate(),
        total_amount: calculator::total_amount(plan, start_date, end_date),
        fine_amount: None,
        additional_amount: None,
        status: RentalStatus::Active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::courier::{Courier, LicenseCategory};
    use crate::domain::money::Money;
    use crate::domain::motorcycle::Motorcycle;
    use crate::domain::ports::RecordStore;
    use crate::error::EligibilityError;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::in_memory::InMemoryStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seeded_store(category: LicenseCategory) -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .apply_all(vec![
                Write::InsertCourier(Courier::new(CourierId(1), "Rui", "11222333000181", "CNH-1", category)),
                Write::InsertMotorcycle(Motorcycle::new(MotorcycleId(1), "CG 160", 2023, "MOT0A01")),
            ])
            .await
            .unwrap();
        store
    }

    fn engine(store: &InMemoryStore, today: NaiveDate) -> RentalEngine {
        RentalEngine::new(Arc::new(store.clone()), Arc::new(FixedClock(today)))
    }

    fn request(rental: u32, plan_days: u32) -> OpenRental {
        OpenRental {
            rental_id: RentalId(rental),
            courier_id: CourierId(1),
            motorcycle_id: MotorcycleId(1),
            plan_days,
        }
    }

    #[tokio::test]
    async fn test_open_derives_dates_and_amounts() {
        let store = seeded_store(LicenseCategory::A).await;
        let engine = engine(&store, date(2024, 1, 1));

        let summary = engine.open_rental(request(1, 7)).await.unwrap();

        assert_eq!(summary.start_date, date(2024, 1, 2));
        assert_eq!(summary.end_date, date(2024, 1, 9));
        assert_eq!(summary.expected_end_date, date(2024, 1, 9));
        assert_eq!(summary.daily_rate, Money::new(dec!(30.00)));
        assert_eq!(summary.total_amount, Money::new(dec!(210.00)));
        assert_eq!(summary.status, RentalStatus::Active);

        let bike = store.find_motorcycle(MotorcycleId(1)).await.unwrap().unwrap();
        assert!(!bike.available);
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_plan_before_lookups() {
        let store = InMemoryStore::new();
        let engine = engine(&store, date(2024, 1, 1));

        let result = engine.open_rental(request(1, 10)).await;
        assert!(matches!(result, Err(OpenError::InvalidPlan(10))));
    }

    #[tokio::test]
    async fn test_open_rejects_duplicate_rental_id() {
        let store = seeded_store(LicenseCategory::A).await;
        store
            .apply_all(vec![Write::InsertMotorcycle(Motorcycle::new(
                MotorcycleId(2),
                "Biz",
                2022,
                "MOT0A02",
            ))])
            .await
            .unwrap();
        let engine = engine(&store, date(2024, 1, 1));
        engine.open_rental(request(1, 7)).await.unwrap();

        let mut second = request(1, 15);
        second.motorcycle_id = MotorcycleId(2);
        let result = engine.open_rental(second).await;

        assert!(matches!(result, Err(OpenError::RentalAlreadyExists(RentalId(1)))));
        let bike = store.find_motorcycle(MotorcycleId(2)).await.unwrap().unwrap();
        assert!(bike.available);
    }

    #[tokio::test]
    async fn test_open_rejects_category_b() {
        let store = seeded_store(LicenseCategory::B).await;
        let engine = engine(&store, date(2024, 1, 1));

        let result = engine.open_rental(request(1, 7)).await;
        assert!(matches!(
            result,
            Err(OpenError::Ineligible(EligibilityError::CourierNotLicensedForCategory))
        ));
        assert!(store.rentals().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_settles_and_releases_motorcycle() {
        let store = seeded_store(LicenseCategory::AB).await;
        let engine = engine(&store, date(2024, 1, 1));
        engine.open_rental(request(1, 7)).await.unwrap();

        let settlement = engine
            .complete_rental(RentalId(1), date(2024, 1, 7))
            .await
            .unwrap();

        assert_eq!(settlement.fine_amount, Money::new(dec!(12.00)));
        assert_eq!(settlement.additional_amount, Money::ZERO);
        assert_eq!(settlement.total_amount, Money::new(dec!(162.00)));

        let rental = engine.rental(RentalId(1)).await.unwrap().unwrap();
        assert_eq!(rental.status, RentalStatus::Completed);
        assert_eq!(rental.return_date, Some(date(2024, 1, 7)));
        assert_eq!(rental.total_amount, settlement.total_amount);
        assert_eq!(rental.daily_rate, Money::new(dec!(30.00)));

        let bike = store.find_motorcycle(MotorcycleId(1)).await.unwrap().unwrap();
        assert!(bike.available);
    }

    #[tokio::test]
    async fn test_complete_twice_fails_without_recharging() {
        let store = seeded_store(LicenseCategory::A).await;
        let engine = engine(&store, date(2024, 1, 1));
        engine.open_rental(request(1, 7)).await.unwrap();
        let first = engine
            .complete_rental(RentalId(1), date(2024, 1, 9))
            .await
            .unwrap();

        let second = engine.complete_rental(RentalId(1), date(2024, 1, 12)).await;
        assert!(matches!(second, Err(CompleteError::RentalNotActive)));

        let rental = engine.rental(RentalId(1)).await.unwrap().unwrap();
        assert_eq!(rental.total_amount, first.total_amount);
        assert_eq!(rental.return_date, Some(date(2024, 1, 9)));
    }

    #[tokio::test]
    async fn test_complete_validations() {
        let store = seeded_store(LicenseCategory::A).await;
        let engine = engine(&store, date(2024, 1, 1));

        assert!(matches!(
            engine.complete_rental(RentalId(9), date(2024, 1, 5)).await,
            Err(CompleteError::RentalNotFound)
        ));

        engine.open_rental(request(1, 7)).await.unwrap();
        assert!(matches!(
            engine.complete_rental(RentalId(1), date(2024, 1, 1)).await,
            Err(CompleteError::ReturnDateBeforeStart)
        ));
        let rental = engine.rental(RentalId(1)).await.unwrap().unwrap();
        assert!(rental.is_active());
    }

    #[tokio::test]
    async fn test_return_on_start_date_is_accepted() {
        let store = seeded_store(LicenseCategory::A).await;
        let engine = engine(&store, date(2024, 1, 1));
        engine.open_rental(request(1, 7)).await.unwrap();

        let settlement = engine
            .complete_rental(RentalId(1), date(2024, 1, 2))
            .await
            .unwrap();
        // No days used, 7 unused days fined at 20%
        assert_eq!(settlement.base_amount, Money::ZERO);
        assert_eq!(settlement.fine_amount, Money::new(dec!(42.00)));
    }

    #[tokio::test]
    async fn test_rentals_for_courier() {
        let store = seeded_store(LicenseCategory::A).await;
        let engine = engine(&store, date(2024, 1, 1));
        engine.open_rental(request(2, 7)).await.unwrap();
        engine
            .complete_rental(RentalId(2), date(2024, 1, 9))
            .await
            .unwrap();
        engine.open_rental(request(1, 15)).await.unwrap();

        let rentals = engine.rentals_for_courier(CourierId(1)).await.unwrap();
        let ids: Vec<_> = rentals.iter().map(|r| r.id).collect();
        assert_eq!(ids, [RentalId(1), RentalId(2)]);
        assert!(engine.rentals_for_courier(CourierId(5)).await.unwrap().is_empty());
    }

    #[test]
    fn test_new_rental_date_overflow() {
        let result = new_rental(&request(1, 50), Plan::Days50, NaiveDate::MAX);
        assert!(matches!(result, Err(OpenError::DateOutOfRange)));
    }
}
