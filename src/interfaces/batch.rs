use crate::application::fleet::FleetService;
use crate::application::lifecycle::RentalEngine;
use crate::domain::rental::Rental;
use crate::error::Result;
use crate::interfaces::csv::command_reader::Command;

/// Applies batch commands to the fleet and the rental lifecycle.
pub struct BatchProcessor {
    engine: RentalEngine,
    fleet: FleetService,
}

impl BatchProcessor {
    pub fn new(engine: RentalEngine, fleet: FleetService) -> Self {
        Self { engine, fleet }
    }

    pub async fn apply(&self, command: Command) -> Result<()> {
        match command {
            Command::RegisterCourier(courier) => {
                self.fleet.register_courier(courier).await?;
            }
            Command::RegisterMotorcycle(motorcycle) => {
                self.fleet.register_motorcycle(motorcycle).await?;
            }
            Command::SetCourierEnabled { courier, enabled } => {
                self.fleet.set_courier_enabled(courier, enabled).await?;
            }
            Command::Open(request) => {
                self.engine.open_rental(request).await?;
            }
            Command::Complete {
                rental,
                return_date,
            } => {
                self.engine.complete_rental(rental, return_date).await?;
            }
            Command::UpdatePlate { motorcycle, plate } => {
                self.fleet.update_plate(motorcycle, plate).await?;
            }
            Command::RemoveMotorcycle(motorcycle) => {
                self.fleet.remove_motorcycle(motorcycle).await?;
            }
        }
        Ok(())
    }

    /// Consumes the processor and returns every rental, ordered by id.
    pub async fn into_results(self) -> Result<Vec<Rental>> {
        Ok(self.engine.rentals().await?)
    }
}
