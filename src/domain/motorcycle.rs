use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MotorcycleId(pub u32);

impl fmt::Display for MotorcycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A motorcycle in the rental fleet.
///
/// `available` is true exactly when no rental on this motorcycle is active.
/// Only the rental lifecycle flips it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Motorcycle {
    pub id: MotorcycleId,
    pub model: String,
    pub year: u16,
    /// License plate, unique across the fleet.
    pub plate: String,
    pub available: bool,
}

impl Motorcycle {
    /// Creates a motorcycle in its registration state (available).
    pub fn new(id: MotorcycleId, model: impl Into<String>, year: u16, plate: impl Into<String>) -> Self {
        Self {
            id,
            model: model.into(),
            year,
            plate: plate.into(),
            available: true,
        }
    }
}
