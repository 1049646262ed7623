use crate::domain::courier::{Courier, CourierId, LicenseCategory};
use crate::domain::events::{FleetEvent, MotorcycleEventRecord};
use crate::domain::motorcycle::{Motorcycle, MotorcycleId};
use crate::domain::ports::{SharedNotifier, SharedRecordStore, Write};
use crate::error::{FleetError, StorageError};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Registration data for a new courier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourier {
    pub id: CourierId,
    pub name: String,
    pub cnpj: String,
    pub birth_date: Option<NaiveDate>,
    pub license_number: String,
    pub license_category: LicenseCategory,
}

/// Registration data for a new motorcycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMotorcycle {
    pub id: MotorcycleId,
    pub model: String,
    pub year: u16,
    pub plate: String,
}

/// Courier and motorcycle management around the rental lifecycle.
///
/// Checks run before each commit to report typed errors. The store guards
/// the same rules inside the batch, so a competing writer that slips in
/// between check and commit surfaces as a conflict, which is then re-checked
/// to name the rule that was broken.
pub struct FleetService {
    store: SharedRecordStore,
    notifier: SharedNotifier,
}

impl FleetService {
    pub fn new(store: SharedRecordStore, notifier: SharedNotifier) -> Self {
        Self { store, notifier }
    }

    pub async fn register_courier(&self, new: NewCourier) -> Result<Courier, FleetError> {
        let mut courier = Courier::new(
            new.id,
            new.name,
            new.cnpj,
            new.license_number,
            new.license_category,
        );
        if let Some(birth_date) = new.birth_date {
            courier = courier.with_birth_date(birth_date);
        }
        self.ensure_courier_free(&courier).await?;

        let outcome = self
            .store
            .apply_all(vec![Write::InsertCourier(courier.clone())])
            .await;
        if matches!(outcome, Err(StorageError::Conflict(_))) {
            self.ensure_courier_free(&courier).await?;
        }
        outcome?;
        info!(courier = %courier.id, license = %courier.license_category, "courier registered");
        Ok(courier)
    }

    pub async fn set_courier_enabled(
        &self,
        id: CourierId,
        enabled: bool,
    ) -> Result<Courier, FleetError> {
        let mut courier = self
            .store
            .find_courier(id)
            .await?
            .ok_or(FleetError::CourierNotFound(id))?;
        let outcome = self
            .store
            .apply_all(vec![Write::SetCourierEnabled {
                courier: id,
                enabled,
            }])
            .await;
        if matches!(outcome, Err(StorageError::Conflict(_)))
            && self.store.find_courier(id).await?.is_none()
        {
            return Err(FleetError::CourierNotFound(id));
        }
        outcome?;
        courier.enabled = enabled;
        Ok(courier)
    }

    /// Registers a motorcycle and announces it.
    ///
    /// Announcements are best-effort: a failing notifier is logged and the
    /// registration still succeeds.
    pub async fn register_motorcycle(&self, new: NewMotorcycle) -> Result<Motorcycle, FleetError> {
        let motorcycle = Motorcycle::new(new.id, new.model, new.year, new.plate);
        self.ensure_motorcycle_free(&motorcycle).await?;

        let outcome = self
            .store
            .apply_all(vec![Write::InsertMotorcycle(motorcycle.clone())])
            .await;
        if matches!(outcome, Err(StorageError::Conflict(_))) {
            self.ensure_motorcycle_free(&motorcycle).await?;
        }
        outcome?;
        info!(motorcycle = %motorcycle.id, plate = %motorcycle.plate, "motorcycle registered");

        for event in FleetEvent::for_registration(&motorcycle) {
            let routing_key = event.routing_key();
            if let Err(e) = self.notifier.publish(event).await {
                warn!(motorcycle = %motorcycle.id, routing_key, error = %e, "failed to publish fleet event");
            }
        }

        Ok(motorcycle)
    }

    pub async fn update_plate(&self, id: MotorcycleId, plate: String) -> Result<(), FleetError> {
        self.ensure_plate_assignable(id, &plate).await?;
        let outcome = self
            .store
            .apply_all(vec![Write::SetPlate {
                motorcycle: id,
                plate: plate.clone(),
            }])
            .await;
        if matches!(outcome, Err(StorageError::Conflict(_))) {
            self.ensure_plate_assignable(id, &plate).await?;
        }
        outcome?;
        info!(motorcycle = %id, plate = %plate, "plate updated");
        Ok(())
    }

    /// Removes a motorcycle that was never rented.
    pub async fn remove_motorcycle(&self, id: MotorcycleId) -> Result<(), FleetError> {
        self.ensure_removable(id).await?;
        let outcome = self
            .store
            .apply_all(vec![Write::DeleteMotorcycle(id)])
            .await;
        if matches!(outcome, Err(StorageError::Conflict(_))) {
            self.ensure_removable(id).await?;
        }
        outcome?;
        info!(motorcycle = %id, "motorcycle removed");
        Ok(())
    }

    /// Motorcycles free to rent, ordered by id.
    pub async fn available_motorcycles(&self) -> Result<Vec<Motorcycle>, FleetError> {
        let mut motorcycles = self.store.motorcycles().await?;
        motorcycles.retain(|m| m.available);
        motorcycles.sort_by_key(|m| m.id);
        Ok(motorcycles)
    }

    /// Motorcycles whose plate contains `fragment`, ordered by id.
    pub async fn motorcycles_by_plate(&self, fragment: &str) -> Result<Vec<Motorcycle>, FleetError> {
        let mut motorcycles = self.store.motorcycles().await?;
        motorcycles.retain(|m| m.plate.contains(fragment));
        motorcycles.sort_by_key(|m| m.id);
        Ok(motorcycles)
    }

    /// Recorded highlight events, ordered by motorcycle.
    pub async fn motorcycle_events(&self) -> Result<Vec<MotorcycleEventRecord>, FleetError> {
        let mut records = self.store.motorcycle_events().await?;
        records.sort_by_key(|r| r.motorcycle_id);
        Ok(records)
    }

    async fn ensure_courier_free(&self, courier: &Courier) -> Result<(), FleetError> {
        if self.store.find_courier(courier.id).await?.is_some() {
            return Err(FleetError::DuplicateCourier(courier.id));
        }
        let couriers = self.store.couriers().await?;
        if couriers
            .iter()
            .any(|c| c.license_number == courier.license_number)
        {
            return Err(FleetError::LicenseNumberTaken(
                courier.license_number.clone(),
            ));
        }
        if couriers.iter().any(|c| c.cnpj == courier.cnpj) {
            return Err(FleetError::CnpjTaken(courier.cnpj.clone()));
        }
        Ok(())
    }

    async fn ensure_motorcycle_free(&self, motorcycle: &Motorcycle) -> Result<(), FleetError> {
        if self.store.find_motorcycle(motorcycle.id).await?.is_some() {
            return Err(FleetError::DuplicateMotorcycle(motorcycle.id));
        }
        self.ensure_plate_free(&motorcycle.plate, None).await
    }

    async fn ensure_plate_assignable(&self, id: MotorcycleId, plate: &str) -> Result<(), FleetError> {
        if self.store.find_motorcycle(id).await?.is_none() {
            return Err(FleetError::MotorcycleNotFound(id));
        }
        self.ensure_plate_free(plate, Some(id)).await
    }

    async fn ensure_removable(&self, id: MotorcycleId) -> Result<(), FleetError> {
        if self.store.find_motorcycle(id).await?.is_none() {
            return Err(FleetError::MotorcycleNotFound(id));
        }
        let rentals = self.store.rentals().await?;
        if rentals.iter().any(|r| r.motorcycle_id == id) {
            return Err(FleetError::HasRentalHistory(id));
        }
        Ok(())
    }

    async fn ensure_plate_free(
        &self,
        plate: &str,
        owner: Option<MotorcycleId>,
    ) -> Result<(), FleetError> {
        let motorcycles = self.store.motorcycles().await?;
        if motorcycles
            .iter()
            .any(|m| m.plate == plate && Some(m.id) != owner)
        {
            return Err(FleetError::PlateAlreadyRegistered(plate.to_string()));
        }
        Ok(())
    }
}
