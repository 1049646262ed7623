//! Adapters behind the domain ports: record stores, clocks and notifiers.

pub mod clock;
pub mod in_memory;
pub mod notifier;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
