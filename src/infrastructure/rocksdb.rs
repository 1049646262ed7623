use crate::domain::courier::{Courier, CourierId};
use crate::domain::events::MotorcycleEventRecord;
use crate::domain::motorcycle::{Motorcycle, MotorcycleId};
use crate::domain::ports::{RecordStore, Write};
use crate::domain::rental::{Rental, RentalId};
use crate::error::StorageError;
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, Direction, ErrorKind, IteratorMode,
    OptimisticTransactionDB, Options, Transaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing couriers.
pub const CF_COURIERS: &str = "couriers";
/// Column Family for storing motorcycles.
pub const CF_MOTORCYCLES: &str = "motorcycles";
/// Column Family for storing rentals.
pub const CF_RENTALS: &str = "rentals";
/// Column Family for storing consumed fleet events.
pub const CF_EVENTS: &str = "motorcycle_events";
/// Column Family for uniqueness and rental history markers.
pub const CF_INDEX: &str = "index";

type Db = OptimisticTransactionDB;

impl From<rocksdb::Error> for StorageError {
    fn from(err: rocksdb::Error) -> Self {
        match err.kind() {
            ErrorKind::Busy | ErrorKind::TryAgain => StorageError::Conflict(err.to_string()),
            _ => StorageError::Unavailable(err.to_string()),
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec(value)
        .map_err(|e| StorageError::Corrupt(format!("Serialization error: {}", e)))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StorageError> {
    serde_json::from_slice(bytes)
        .map_err(|e| StorageError::Corrupt(format!("Deserialization error: {}", e)))
}

fn index_key(kind: &str, value: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(kind.len() + 1 + value.len());
    key.extend_from_slice(kind.as_bytes());
    key.push(b':');
    key.extend_from_slice(value);
    key
}

fn history_key(motorcycle: MotorcycleId) -> Vec<u8> {
    index_key("history", &motorcycle.0.to_be_bytes())
}

/// A persistent store implementation using RocksDB.
///
/// Couriers, motorcycles and rentals live in separate Column Families, keyed
/// by their big-endian id and stored as JSON. Unique license numbers, CNPJs
/// and plates, plus the motorcycles with rental history, are kept as marker
/// keys in the index Column Family.
///
/// Batches run inside an optimistic transaction: every guarded key is read
/// with `get_for_update`, so a concurrent commit touching the same motorcycle,
/// rental or marker makes this commit fail with [`StorageError::Conflict`].
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc`).
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<Db>,
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that every Column Family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_COURIERS, CF_MOTORCYCLES, CF_RENTALS, CF_EVENTS, CF_INDEX]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = Db::open_cf_descriptors(&opts, path, families)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily, StorageError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::Unavailable(format!("{name} column family not found")))
    }

    fn get<T: DeserializeOwned>(&self, family: &str, key: u32) -> Result<Option<T>, StorageError> {
        let cf = self.cf(family)?;
        match self.db.get_cf(cf, key.to_be_bytes())? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, family: &str) -> Result<Vec<T>, StorageError> {
        let cf = self.cf(family)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(decode(&value)?);
        }
        Ok(records)
    }

    fn locked<T: DeserializeOwned>(
        &self,
        txn: &Transaction<'_, Db>,
        family: &str,
        key: u32,
    ) -> Result<Option<T>, StorageError> {
        let cf = self.cf(family)?;
        match txn.get_for_update_cf(cf, key.to_be_bytes(), true)? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(
        &self,
        txn: &Transaction<'_, Db>,
        family: &str,
        key: u32,
        value: &T,
    ) -> Result<(), StorageError> {
        let cf = self.cf(family)?;
        txn.put_cf(cf, key.to_be_bytes(), encode(value)?)?;
        Ok(())
    }

    fn existing_motorcycle(
        &self,
        txn: &Transaction<'_, Db>,
        id: MotorcycleId,
    ) -> Result<Motorcycle, StorageError> {
        self.locked(txn, CF_MOTORCYCLES, id.0)?
            .ok_or_else(|| StorageError::Conflict(format!("motorcycle {id} does not exist")))
    }

    /// Marks `value` of `kind` as owned by `owner`, failing if another record holds it.
    fn claim(
        &self,
        txn: &Transaction<'_, Db>,
        kind: &str,
        value: &str,
        owner: u32,
    ) -> Result<(), StorageError> {
        let cf = self.cf(CF_INDEX)?;
        let key = index_key(kind, value.as_bytes());
        if let Some(holder) = txn.get_for_update_cf(cf, &key, true)?
            && holder.as_slice() != owner.to_be_bytes()
        {
            return Err(StorageError::Conflict(format!(
                "{kind} {value} is already registered"
            )));
        }
        txn.put_cf(cf, key, owner.to_be_bytes())?;
        Ok(())
    }

    fn release(&self, txn: &Transaction<'_, Db>, kind: &str, value: &str) -> Result<(), StorageError> {
        let cf = self.cf(CF_INDEX)?;
        txn.delete_cf(cf, index_key(kind, value.as_bytes()))?;
        Ok(())
    }

    /// Next free event key for `motorcycle`: its id followed by a sequence number.
    fn next_event_key(&self, motorcycle: MotorcycleId) -> Result<Vec<u8>, StorageError> {
        let cf = self.cf(CF_EVENTS)?;
        let prefix = motorcycle.0.to_be_bytes();
        let mut sequence: u32 = 0;
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward))
        {
            let (key, _value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            sequence += 1;
        }
        let mut key = prefix.to_vec();
        key.extend_from_slice(&sequence.to_be_bytes());
        Ok(key)
    }

    fn stage(&self, txn: &Transaction<'_, Db>, write: Write) -> Result<(), StorageError> {
        match write {
            Write::InsertCourier(courier) => {
                let existing: Option<Courier> = self.locked(txn, CF_COURIERS, courier.id.0)?;
                if existing.is_some() {
                    return Err(StorageError::Conflict(format!(
                        "courier {} already exists",
                        courier.id
                    )));
                }
                self.claim(txn, "license", &courier.license_number, courier.id.0)?;
                self.claim(txn, "cnpj", &courier.cnpj, courier.id.0)?;
                self.put(txn, CF_COURIERS, courier.id.0, &courier)
            }
            Write::SetCourierEnabled { courier, enabled } => {
                let mut stored: Courier =
                    self.locked(txn, CF_COURIERS, courier.0)?.ok_or_else(|| {
                        StorageError::Conflict(format!("courier {courier} does not exist"))
                    })?;
                stored.enabled = enabled;
                self.put(txn, CF_COURIERS, courier.0, &stored)
            }
            Write::InsertMotorcycle(motorcycle) => {
                let existing: Option<Motorcycle> =
                    self.locked(txn, CF_MOTORCYCLES, motorcycle.id.0)?;
                if existing.is_some() {
                    return Err(StorageError::Conflict(format!(
                        "motorcycle {} already exists",
                        motorcycle.id
                    )));
                }
                self.claim(txn, "plate", &motorcycle.plate, motorcycle.id.0)?;
                self.put(txn, CF_MOTORCYCLES, motorcycle.id.0, &motorcycle)
            }
            Write::SetPlate { motorcycle, plate } => {
                let mut stored = self.existing_motorcycle(txn, motorcycle)?;
                if stored.plate != plate {
                    self.release(txn, "plate", &stored.plate)?;
                    self.claim(txn, "plate", &plate, motorcycle.0)?;
                    stored.plate = plate;
                }
                self.put(txn, CF_MOTORCYCLES, motorcycle.0, &stored)
            }
            Write::DeleteMotorcycle(id) => {
                let stored = self.existing_motorcycle(txn, id)?;
                let index = self.cf(CF_INDEX)?;
                let has_history = txn.get_for_update_cf(index, history_key(id), true)?.is_some();
                if !stored.available || has_history {
                    return Err(StorageError::Conflict(format!(
                        "motorcycle {id} has rental history"
                    )));
                }
                self.release(txn, "plate", &stored.plate)?;
                let cf = self.cf(CF_MOTORCYCLES)?;
                txn.delete_cf(cf, id.0.to_be_bytes())?;
                Ok(())
            }
            Write::InsertRental(rental) => {
                let existing: Option<Rental> = self.locked(txn, CF_RENTALS, rental.id.0)?;
                if existing.is_some() {
                    return Err(StorageError::Conflict(format!(
                        "rental {} already exists",
                        rental.id
                    )));
                }
                let index = self.cf(CF_INDEX)?;
                txn.put_cf(index, history_key(rental.motorcycle_id), rental.id.0.to_be_bytes())?;
                self.put(txn, CF_RENTALS, rental.id.0, &rental)
            }
            Write::UpdateRental { rental, expected } => {
                let stored: Rental = self.locked(txn, CF_RENTALS, rental.id.0)?.ok_or_else(|| {
                    StorageError::Conflict(format!("rental {} does not exist", rental.id))
                })?;
                if stored.status != expected {
                    return Err(StorageError::Conflict(format!(
                        "rental {} is {}, expected {}",
                        rental.id, stored.status, expected
                    )));
                }
                self.put(txn, CF_RENTALS, rental.id.0, &rental)
            }
            Write::SetAvailability {
                motorcycle,
                expected,
                available,
            } => {
                let mut stored = self.existing_motorcycle(txn, motorcycle)?;
                if stored.available != expected {
                    return Err(StorageError::Conflict(format!(
                        "motorcycle {motorcycle} availability changed"
                    )));
                }
                stored.available = available;
                self.put(txn, CF_MOTORCYCLES, motorcycle.0, &stored)
            }
            Write::RecordEvent(record) => {
                let cf = self.cf(CF_EVENTS)?;
                let key = self.next_event_key(record.motorcycle_id)?;
                if txn.get_for_update_cf(cf, &key, true)?.is_some() {
                    return Err(StorageError::Conflict(format!(
                        "event slot for motorcycle {} taken",
                        record.motorcycle_id
                    )));
                }
                txn.put_cf(cf, key, encode(&record)?)?;
                Ok(())
            }
        }
    }

    fn commit(&self, writes: Vec<Write>) -> Result<(), StorageError> {
        let txn = self.db.transaction();
        for write in writes {
            // Dropping an uncommitted transaction discards its staged writes.
            self.stage(&txn, write)?;
        }
        txn.commit()?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for RocksDbStore {
    async fn find_courier(&self, id: CourierId) -> Result<Option<Courier>, StorageError> {
        self.get(CF_COURIERS, id.0)
    }

    async fn find_motorcycle(&self, id: MotorcycleId) -> Result<Option<Motorcycle>, StorageError> {
        self.get(CF_MOTORCYCLES, id.0)
    }

    async fn find_rental(&self, id: RentalId) -> Result<Option<Rental>, StorageError> {
        self.get(CF_RENTALS, id.0)
    }

    async fn couriers(&self) -> Result<Vec<Courier>, StorageError> {
        self.scan(CF_COURIERS)
    }

    async fn motorcycles(&self) -> Result<Vec<Motorcycle>, StorageError> {
        self.scan(CF_MOTORCYCLES)
    }

    async fn rentals(&self) -> Result<Vec<Rental>, StorageError> {
        self.scan(CF_RENTALS)
    }

    async fn motorcycle_events(&self) -> Result<Vec<MotorcycleEventRecord>, StorageError> {
        self.scan(CF_EVENTS)
    }

    async fn apply_all(&self, writes: Vec<Write>) -> Result<(), StorageError> {
        self.commit(writes)
    }
}
