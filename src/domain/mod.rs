//! Domain layer: rental entities, pricing rules and the ports the
//! application layer talks through.

pub mod calculator;
pub mod courier;
pub mod eligibility;
pub mod events;
pub mod money;
pub mod motorcycle;
pub mod ports;
pub mod pricing;
pub mod rental;
