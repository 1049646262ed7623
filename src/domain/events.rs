use super::motorcycle::{Motorcycle, MotorcycleId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Year whose registrations get an extra notification.
pub const HIGHLIGHTED_YEAR: u16 = 2024;

/// Fleet announcements published after a motorcycle is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum FleetEvent {
    MotorcycleRegistered {
        id: MotorcycleId,
        plate: String,
        year: u16,
    },
    Year2024Notification {
        id: MotorcycleId,
        plate: String,
        year: u16,
    },
}

impl FleetEvent {
    pub fn routing_key(&self) -> &'static str {
        match self {
            Self::MotorcycleRegistered { .. } => "motorcycle.registered",
            Self::Year2024Notification { .. } => "motorcycle.year.2024",
        }
    }

    /// Events announcing the registration of `motorcycle`.
    pub fn for_registration(motorcycle: &Motorcycle) -> Vec<FleetEvent> {
        let mut events = vec![FleetEvent::MotorcycleRegistered {
            id: motorcycle.id,
            plate: motorcycle.plate.clone(),
            year: motorcycle.year,
        }];
        if motorcycle.year == HIGHLIGHTED_YEAR {
            events.push(FleetEvent::Year2024Notification {
                id: motorcycle.id,
                plate: motorcycle.plate.clone(),
                year: motorcycle.year,
            });
        }
        events
    }
}

/// A consumed fleet event kept for auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorcycleEventRecord {
    pub motorcycle_id: MotorcycleId,
    pub event_type: String,
    pub recorded_on: NaiveDate,
    pub details: String,
}

impl MotorcycleEventRecord {
    /// The record kept for a consumed `Year2024Notification`, if `event` is one.
    pub fn from_highlight(event: &FleetEvent, recorded_on: NaiveDate) -> Option<Self> {
        match event {
            FleetEvent::Year2024Notification { id, plate, year } => Some(Self {
                motorcycle_id: *id,
                event_type: "Year2024Notification".to_string(),
                recorded_on,
                details: format!("motorcycle {plate} from year {year}"),
            }),
            FleetEvent::MotorcycleRegistered { .. } => None,
        }
    }
}
