use crate::domain::courier::{Courier, CourierId};
use crate::domain::events::MotorcycleEventRecord;
use crate::domain::motorcycle::{Motorcycle, MotorcycleId};
use crate::domain::ports::{RecordStore, Write};
use crate::domain::rental::{Rental, RentalId};
use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    couriers: HashMap<CourierId, Courier>,
    motorcycles: HashMap<MotorcycleId, Motorcycle>,
    rentals: HashMap<RentalId, Rental>,
    events: Vec<MotorcycleEventRecord>,
    license_numbers: HashMap<String, CourierId>,
    cnpjs: HashMap<String, CourierId>,
    plates: HashMap<String, MotorcycleId>,
    /// Number of rentals that reference each motorcycle.
    rental_history: HashMap<MotorcycleId, usize>,
}

/// Previous state of a row touched by the current batch.
enum Undo {
    Courier(CourierId, Option<Courier>),
    Motorcycle(MotorcycleId, Option<Motorcycle>),
    Rental(RentalId, Option<Rental>),
    Event,
}

impl Tables {
    fn replace_courier(&mut self, id: CourierId, courier: Option<Courier>) -> Option<Courier> {
        let previous = self.couriers.remove(&id);
        if let Some(old) = &previous {
            self.license_numbers.remove(&old.license_number);
            self.cnpjs.remove(&old.cnpj);
        }
        if let Some(new) = courier {
            self.license_numbers.insert(new.license_number.clone(), id);
            self.cnpjs.insert(new.cnpj.clone(), id);
            self.couriers.insert(id, new);
        }
        previous
    }

    fn replace_motorcycle(
        &mut self,
        id: MotorcycleId,
        motorcycle: Option<Motorcycle>,
    ) -> Option<Motorcycle> {
        let previous = self.motorcycles.remove(&id);
        if let Some(old) = &previous {
            self.plates.remove(&old.plate);
        }
        if let Some(new) = motorcycle {
            self.plates.insert(new.plate.clone(), id);
            self.motorcycles.insert(id, new);
        }
        previous
    }

    fn replace_rental(&mut self, id: RentalId, rental: Option<Rental>) -> Option<Rental> {
        let previous = self.rentals.remove(&id);
        if let Some(old) = &previous
            && let Some(count) = self.rental_history.get_mut(&old.motorcycle_id)
        {
            *count -= 1;
            if *count == 0 {
                self.rental_history.remove(&old.motorcycle_id);
            }
        }
        if let Some(new) = rental {
            *self.rental_history.entry(new.motorcycle_id).or_default() += 1;
            self.rentals.insert(id, new);
        }
        previous
    }

    fn existing_motorcycle(&self, id: MotorcycleId) -> Result<Motorcycle, StorageError> {
        self.motorcycles
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::Conflict(format!("motorcycle {id} does not exist")))
    }

    fn ensure_plate_free(&self, plate: &str, owner: MotorcycleId) -> Result<(), StorageError> {
        match self.plates.get(plate) {
            Some(holder) if *holder != owner => Err(StorageError::Conflict(format!(
                "plate {plate} belongs to motorcycle {holder}"
            ))),
            _ => Ok(()),
        }
    }

    /// Applies one write, recording what it replaced. Fails without side
    /// effects when its guard does not hold.
    fn apply(&mut self, write: Write, undo: &mut Vec<Undo>) -> Result<(), StorageError> {
        match write {
            Write::InsertCourier(courier) => {
                if self.couriers.contains_key(&courier.id) {
                    return Err(StorageError::Conflict(format!(
                        "courier {} already exists",
                        courier.id
                    )));
                }
                if let Some(holder) = self.license_numbers.get(&courier.license_number) {
                    return Err(StorageError::Conflict(format!(
                        "license number {} belongs to courier {holder}",
                        courier.license_number
                    )));
                }
                if let Some(holder) = self.cnpjs.get(&courier.cnpj) {
                    return Err(StorageError::Conflict(format!(
                        "CNPJ {} belongs to courier {holder}",
                        courier.cnpj
                    )));
                }
                let id = courier.id;
                let previous = self.replace_courier(id, Some(courier));
                undo.push(Undo::Courier(id, previous));
            }
            Write::SetCourierEnabled { courier, enabled } => {
                let mut stored = self.couriers.get(&courier).cloned().ok_or_else(|| {
                    StorageError::Conflict(format!("courier {courier} does not exist"))
                })?;
                stored.enabled = enabled;
                let previous = self.replace_courier(courier, Some(stored));
                undo.push(Undo::Courier(courier, previous));
            }
            Write::InsertMotorcycle(motorcycle) => {
                if self.motorcycles.contains_key(&motorcycle.id) {
                    return Err(StorageError::Conflict(format!(
                        "motorcycle {} already exists",
                        motorcycle.id
                    )));
                }
                self.ensure_plate_free(&motorcycle.plate, motorcycle.id)?;
                let id = motorcycle.id;
                let previous = self.replace_motorcycle(id, Some(motorcycle));
                undo.push(Undo::Motorcycle(id, previous));
            }
            Write::SetPlate { motorcycle, plate } => {
                let mut stored = self.existing_motorcycle(motorcycle)?;
                self.ensure_plate_free(&plate, motorcycle)?;
                stored.plate = plate;
                let previous = self.replace_motorcycle(motorcycle, Some(stored));
                undo.push(Undo::Motorcycle(motorcycle, previous));
            }
            Write::DeleteMotorcycle(id) => {
                let stored = self.existing_motorcycle(id)?;
                if !stored.available || self.rental_history.contains_key(&id) {
                    return Err(StorageError::Conflict(format!(
                        "motorcycle {id} has rental history"
                    )));
                }
                let previous = self.replace_motorcycle(id, None);
                undo.push(Undo::Motorcycle(id, previous));
            }
            Write::InsertRental(rental) => {
                if self.rentals.contains_key(&rental.id) {
                    return Err(StorageError::Conflict(format!(
                        "rental {} already exists",
                        rental.id
                    )));
                }
                let id = rental.id;
                let previous = self.replace_rental(id, Some(rental));
                undo.push(Undo::Rental(id, previous));
            }
            Write::UpdateRental { rental, expected } => {
                let stored = self.rentals.get(&rental.id).ok_or_else(|| {
                    StorageError::Conflict(format!("rental {} does not exist", rental.id))
                })?;
                if stored.status != expected {
                    return Err(StorageError::Conflict(format!(
                        "rental {} is {}, expected {}",
                        rental.id, stored.status, expected
                    )));
                }
                let id = rental.id;
                let previous = self.replace_rental(id, Some(rental));
                undo.push(Undo::Rental(id, previous));
            }
            Write::SetAvailability {
                motorcycle,
                expected,
                available,
            } => {
                let mut stored = self.existing_motorcycle(motorcycle)?;
                if stored.available != expected {
                    return Err(StorageError::Conflict(format!(
                        "motorcycle {motorcycle} availability changed"
                    )));
                }
                stored.available = available;
                let previous = self.replace_motorcycle(motorcycle, Some(stored));
                undo.push(Undo::Motorcycle(motorcycle, previous));
            }
            Write::RecordEvent(record) => {
                self.events.push(record);
                undo.push(Undo::Event);
            }
        }
        Ok(())
    }

    /// Restores the rows touched by a failed batch, newest change first.
    fn rollback(&mut self, undo: Vec<Undo>) {
        for step in undo.into_iter().rev() {
            match step {
                Undo::Courier(id, previous) => {
                    self.replace_courier(id, previous);
                }
                Undo::Motorcycle(id, previous) => {
                    self.replace_motorcycle(id, previous);
                }
                Undo::Rental(id, previous) => {
                    self.replace_rental(id, previous);
                }
                Undo::Event => {
                    self.events.pop();
                }
            }
        }
    }
}

/// A thread-safe in-memory record store.
///
/// All tables sit behind one `Arc<RwLock<_>>`, so a batch commits under a
/// single write lock. Writes apply in place and a failing guard undoes the
/// rows the batch already touched. Ideal for testing or runs where
/// persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn find_courier(&self, id: CourierId) -> Result<Option<Courier>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.couriers.get(&id).cloned())
    }

    async fn find_motorcycle(&self, id: MotorcycleId) -> Result<Option<Motorcycle>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.motorcycles.get(&id).cloned())
    }

    async fn find_rental(&self, id: RentalId) -> Result<Option<Rental>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.rentals.get(&id).cloned())
    }

    async fn couriers(&self) -> Result<Vec<Courier>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.couriers.values().cloned().collect())
    }

    async fn motorcycles(&self) -> Result<Vec<Motorcycle>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.motorcycles.values().cloned().collect())
    }

    async fn rentals(&self) -> Result<Vec<Rental>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.rentals.values().cloned().collect())
    }

    async fn motorcycle_events(&self) -> Result<Vec<MotorcycleEventRecord>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.events.clone())
    }

    async fn apply_all(&self, writes: Vec<Write>) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        let mut undo = Vec::new();
        for write in writes {
            if let Err(err) = tables.apply(write, &mut undo) {
                tables.rollback(undo);
                return Err(err);
            }
        }
        Ok(())
    }
}
