use crate::application::fleet::{NewCourier, NewMotorcycle};
use crate::application::lifecycle::OpenRental;
use crate::domain::courier::{CourierId, LicenseCategory};
use crate::domain::motorcycle::MotorcycleId;
use crate::domain::rental::RentalId;
use crate::error::{AppError, CommandError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Courier,
    Motorcycle,
    Disable,
    Enable,
    Open,
    Complete,
    #[serde(rename = "update-plate")]
    UpdatePlate,
    Remove,
}

impl CommandType {
    fn name(&self) -> &'static str {
        match self {
            Self::Courier => "courier",
            Self::Motorcycle => "motorcycle",
            Self::Disable => "disable",
            Self::Enable => "enable",
            Self::Open => "open",
            Self::Complete => "complete",
            Self::UpdatePlate => "update-plate",
            Self::Remove => "remove",
        }
    }
}

/// One raw CSV row. Which optional columns are required depends on `type`.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
pub struct CommandRecord {
    pub r#type: CommandType,
    pub id: u32,
    #[serde(default)]
    pub courier: Option<u32>,
    #[serde(default)]
    pub motorcycle: Option<u32>,
    #[serde(default)]
    pub plan: Option<u32>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub plate: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub cnpj: Option<String>,
}

/// A validated batch command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RegisterCourier(NewCourier),
    RegisterMotorcycle(NewMotorcycle),
    SetCourierEnabled { courier: CourierId, enabled: bool },
    Open(OpenRental),
    Complete { rental: RentalId, return_date: NaiveDate },
    UpdatePlate { motorcycle: MotorcycleId, plate: String },
    RemoveMotorcycle(MotorcycleId),
}

fn required<T>(value: Option<T>, command: CommandType, field: &'static str) -> Result<T, CommandError> {
    value.ok_or(CommandError::MissingField {
        command: command.name(),
        field,
    })
}

impl TryFrom<CommandRecord> for Command {
    type Error = CommandError;

    fn try_from(record: CommandRecord) -> Result<Self, Self::Error> {
        let kind = record.r#type;
        let command = match kind {
            CommandType::Courier => {
                // Identity columns are optional and fall back to values derived from the id
                let license = required(record.license, kind, "license")?;
                Command::RegisterCourier(NewCourier {
                    id: CourierId(record.id),
                    name: record
                        .name
                        .unwrap_or_else(|| format!("courier-{}", record.id)),
                    cnpj: record.cnpj.unwrap_or_else(|| format!("{:014}", record.id)),
                    birth_date: record.date,
                    license_number: record
                        .license_number
                        .unwrap_or_else(|| format!("CNH-{:08}", record.id)),
                    license_category: license.parse::<LicenseCategory>()?,
                })
            }
            CommandType::Motorcycle => Command::RegisterMotorcycle(NewMotorcycle {
                id: MotorcycleId(record.id),
                plate: required(record.plate, kind, "plate")?,
                model: required(record.model, kind, "model")?,
                year: required(record.year, kind, "year")?,
            }),
            CommandType::Disable | CommandType::Enable => Command::SetCourierEnabled {
                courier: CourierId(record.id),
                enabled: kind == CommandType::Enable,
            },
            CommandType::Open => Command::Open(OpenRental {
                rental_id: RentalId(record.id),
                courier_id: CourierId(required(record.courier, kind, "courier")?),
                motorcycle_id: MotorcycleId(required(record.motorcycle, kind, "motorcycle")?),
                plan_days: required(record.plan, kind, "plan")?,
            }),
            CommandType::Complete => Command::Complete {
                rental: RentalId(record.id),
                return_date: required(record.date, kind, "date")?,
            },
            CommandType::UpdatePlate => Command::UpdatePlate {
                motorcycle: MotorcycleId(record.id),
                plate: required(record.plate, kind, "plate")?,
            },
            CommandType::Remove => Command::RemoveMotorcycle(MotorcycleId(record.id)),
        };
        Ok(command)
    }
}

/// Reads batch commands from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Command>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads, deserializes and validates commands.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader.into_deserialize().map(|result| {
            let record: CommandRecord = result.map_err(AppError::from)?;
            Command::try_from(record).map_err(AppError::from)
        })
    }
}
