use crate::domain::money::Money;
use crate::domain::rental::{Rental, RentalStatus};
use crate::error::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

/// One ledger line per rental.
#[derive(Debug, Serialize)]
struct LedgerRow {
    rental: u32,
    courier: u32,
    motorcycle: u32,
    plan_days: u32,
    start_date: NaiveDate,
    expected_end_date: NaiveDate,
    return_date: Option<NaiveDate>,
    daily_rate: Money,
    total_amount: Money,
    fine_amount: Option<Money>,
    additional_amount: Option<Money>,
    status: RentalStatus,
}

impl From<&Rental> for LedgerRow {
    fn from(rental: &Rental) -> Self {
        Self {
            rental: rental.id.0,
            courier: rental.courier_id.0,
            motorcycle: rental.motorcycle_id.0,
            plan_days: rental.plan.days(),
            start_date: rental.start_date,
            expected_end_date: rental.expected_end_date,
            return_date: rental.return_date,
            daily_rate: rental.daily_rate,
            total_amount: rental.total_amount,
            fine_amount: rental.fine_amount,
            additional_amount: rental.additional_amount,
            status: rental.status,
        }
    }
}

/// Writes the rental ledger as CSV.
pub struct RentalWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RentalWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header followed by one row per rental, in the given order.
    pub fn write_rentals(&mut self, rentals: &[Rental]) -> Result<()> {
        if rentals.is_empty() {
            // serialize() only emits the header along with the first row
            self.writer.write_record([
                "rental",
                "courier",
                "motorcycle",
                "plan_days",
                "start_date",
                "expected_end_date",
                "return_date",
                "daily_rate",
                "total_amount",
                "fine_amount",
                "additional_amount",
                "status",
            ])?;
        }
        for rental in rentals {
            self.writer.serialize(LedgerRow::from(rental))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
