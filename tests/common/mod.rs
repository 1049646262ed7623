#![allow(dead_code)]

use chrono::NaiveDate;
use motorent::application::lifecycle::{OpenRental, RentalEngine};
use motorent::domain::courier::{Courier, CourierId, LicenseCategory};
use motorent::domain::motorcycle::{Motorcycle, MotorcycleId};
use motorent::domain::ports::{RecordStore, Write};
use motorent::domain::rental::RentalId;
use motorent::infrastructure::clock::FixedClock;
use motorent::infrastructure::in_memory::InMemoryStore;
use std::io::Write as _;
use std::sync::Arc;
use tempfile::NamedTempFile;

pub const HEADER: &str =
    "type, id, courier, motorcycle, plan, date, license, plate, model, year, name, license_number, cnpj";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A store holding `couriers` couriers of the given category and `motorcycles`
/// available motorcycles, ids starting at 1.
pub async fn seeded_store(
    couriers: u32,
    category: LicenseCategory,
    motorcycles: u32,
) -> InMemoryStore {
    let store = InMemoryStore::new();
    let mut writes = Vec::new();
    for id in 1..=couriers {
        writes.push(Write::InsertCourier(Courier::new(
            CourierId(id),
            format!("courier-{id}"),
            format!("{id:014}"),
            format!("CNH-{id}"),
            category,
        )));
    }
    for id in 1..=motorcycles {
        writes.push(Write::InsertMotorcycle(Motorcycle::new(
            MotorcycleId(id),
            "CG 160",
            2023,
            format!("TST{id:04}"),
        )));
    }
    store.apply_all(writes).await.unwrap();
    store
}

pub fn engine(store: &InMemoryStore, today: NaiveDate) -> RentalEngine {
    RentalEngine::new(Arc::new(store.clone()), Arc::new(FixedClock(today)))
}

pub fn open_request(rental: u32, courier: u32, motorcycle: u32, plan_days: u32) -> OpenRental {
    OpenRental {
        rental_id: RentalId(rental),
        courier_id: CourierId(courier),
        motorcycle_id: MotorcycleId(motorcycle),
        plan_days,
    }
}

/// Checks that every motorcycle is available exactly when it has no active
/// rental, and that no motorcycle has more than one active rental.
pub async fn assert_availability_invariant(store: &dyn RecordStore) {
    let rentals = store.rentals().await.unwrap();
    for motorcycle in store.motorcycles().await.unwrap() {
        let active = rentals
            .iter()
            .filter(|r| r.motorcycle_id == motorcycle.id && r.is_active())
            .count();
        assert!(active <= 1, "motorcycle {} has {active} active rentals", motorcycle.id);
        assert_eq!(
            motorcycle.available,
            active == 0,
            "motorcycle {} availability disagrees with its rentals",
            motorcycle.id
        );
    }
}

/// Writes a commands CSV (header included) to a temporary file.
pub fn commands_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}
