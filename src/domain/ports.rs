use super::courier::{Courier, CourierId};
use super::events::{FleetEvent, MotorcycleEventRecord};
use super::motorcycle::{Motorcycle, MotorcycleId};
use super::rental::{Rental, RentalId, RentalStatus};
use crate::error::{NotifyError, StorageError};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// One entity write inside an atomic [`RecordStore::apply_all`] batch.
///
/// Guarded variants fail the whole batch with [`StorageError::Conflict`] when
/// the stored record does not match the expectation.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Insert a courier whose id, license number and CNPJ are all unused.
    InsertCourier(Courier),
    /// Toggle the enabled flag of an existing courier.
    SetCourierEnabled { courier: CourierId, enabled: bool },
    /// Insert a motorcycle whose id and plate are not taken yet.
    InsertMotorcycle(Motorcycle),
    /// Change the plate of an existing motorcycle, leaving availability alone.
    /// The new plate must not belong to another motorcycle.
    SetPlate {
        motorcycle: MotorcycleId,
        plate: String,
    },
    /// Delete an available motorcycle that no rental has ever referenced.
    DeleteMotorcycle(MotorcycleId),
    /// Insert a rental whose id is not taken yet.
    InsertRental(Rental),
    /// Replace a rental whose stored status is still `expected`.
    UpdateRental { rental: Rental, expected: RentalStatus },
    /// `UPDATE motorcycle SET available = $available WHERE id = $motorcycle AND available = $expected`
    SetAvailability {
        motorcycle: MotorcycleId,
        expected: bool,
        available: bool,
    },
    /// Append a consumed fleet event.
    RecordEvent(MotorcycleEventRecord),
}

/// Keyed record storage for couriers, motorcycles and rentals.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_courier(&self, id: CourierId) -> Result<Option<Courier>, StorageError>;
    async fn find_motorcycle(&self, id: MotorcycleId) -> Result<Option<Motorcycle>, StorageError>;
    async fn find_rental(&self, id: RentalId) -> Result<Option<Rental>, StorageError>;
    async fn couriers(&self) -> Result<Vec<Courier>, StorageError>;
    async fn motorcycles(&self) -> Result<Vec<Motorcycle>, StorageError>;
    async fn rentals(&self) -> Result<Vec<Rental>, StorageError>;
    async fn motorcycle_events(&self) -> Result<Vec<MotorcycleEventRecord>, StorageError>;
    /// Commits every write or none of them.
    async fn apply_all(&self, writes: Vec<Write>) -> Result<(), StorageError>;
}

pub type SharedRecordStore = Arc<dyn RecordStore>;

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub type SharedClock = Arc<dyn Clock>;

/// Best-effort publisher of fleet events.
#[async_trait]
pub trait EventNotifier: Send + Sync {
    async fn publish(&self, event: FleetEvent) -> Result<(), NotifyError>;
}

pub type SharedNotifier = Arc<dyn EventNotifier>;
