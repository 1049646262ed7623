//! Application layer orchestrating the domain over the storage ports.
//!
//! `RentalEngine` owns the rental lifecycle (open and complete),
//! `FleetService` covers courier and motorcycle management around it, and
//! `EventRecorder` consumes the fleet events it publishes.

pub mod fleet;
pub mod lifecycle;
pub mod recorder;
