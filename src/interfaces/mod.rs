//! Front ends driving the application layer.

pub mod batch;
pub mod csv;
