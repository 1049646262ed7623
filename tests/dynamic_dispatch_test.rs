use chrono::NaiveDate;
use motorent::application::fleet::{FleetService, NewCourier, NewMotorcycle};
use motorent::application::lifecycle::{OpenRental, RentalEngine};
use motorent::domain::courier::{CourierId, LicenseCategory};
use motorent::domain::motorcycle::MotorcycleId;
use motorent::domain::ports::{SharedClock, SharedNotifier, SharedRecordStore};
use motorent::domain::rental::{RentalId, RentalStatus};
use motorent::infrastructure::clock::FixedClock;
use motorent::infrastructure::in_memory::InMemoryStore;
use motorent::infrastructure::notifier::LogNotifier;
use std::sync::Arc;

#[tokio::test]
async fn test_services_over_trait_objects() {
    let store: SharedRecordStore = Arc::new(InMemoryStore::new());
    let clock: SharedClock = Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
    let notifier: SharedNotifier = Arc::new(LogNotifier);

    let fleet = FleetService::new(store.clone(), notifier);
    let engine = RentalEngine::new(store.clone(), clock);

    // Verify Send + Sync by spawning tasks
    let fleet_handle = tokio::spawn(async move {
        fleet
            .register_courier(NewCourier {
                id: CourierId(1),
                name: "Ana".to_string(),
                cnpj: "11222333000181".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1995, 8, 20),
                license_number: "CNH-00000001".to_string(),
                license_category: LicenseCategory::A,
            })
            .await
            .unwrap();
        fleet
            .register_motorcycle(NewMotorcycle {
                id: MotorcycleId(1),
                model: "CG 160".to_string(),
                year: 2024,
                plate: "ABC1D23".to_string(),
            })
            .await
            .unwrap()
    });
    let motorcycle = fleet_handle.await.unwrap();
    assert!(motorcycle.available);

    let engine_handle = tokio::spawn(async move {
        engine
            .open_rental(OpenRental {
                rental_id: RentalId(1),
                courier_id: CourierId(1),
                motorcycle_id: MotorcycleId(1),
                plan_days: 45,
            })
            .await
            .unwrap()
    });
    let summary = engine_handle.await.unwrap();
    assert_eq!(summary.status, RentalStatus::Active);

    let stored = store.find_motorcycle(MotorcycleId(1)).await.unwrap().unwrap();
    assert!(!stored.available);
}
