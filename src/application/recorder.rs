use crate::domain::events::{FleetEvent, MotorcycleEventRecord};
use crate::domain::ports::{SharedClock, SharedRecordStore, Write};
use crate::error::StorageError;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Consumer side of the fleet event channel.
///
/// Every event is logged. `Year2024Notification`s are also stored as
/// [`MotorcycleEventRecord`]s dated with the recorder's clock.
pub struct EventRecorder {
    store: SharedRecordStore,
    clock: SharedClock,
}

impl EventRecorder {
    pub fn new(store: SharedRecordStore, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    /// Runs [`EventRecorder::run`] on its own task.
    pub fn spawn(self, events: UnboundedReceiver<FleetEvent>) -> JoinHandle<usize> {
        tokio::spawn(self.run(events))
    }

    /// Drains `events` until every sender is gone and returns how many
    /// records were stored. A record that fails to store is logged and skipped.
    pub async fn run(self, mut events: UnboundedReceiver<FleetEvent>) -> usize {
        let mut recorded = 0;
        while let Some(event) = events.recv().await {
            match self.record(&event).await {
                Ok(true) => recorded += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(routing_key = event.routing_key(), error = %e, "failed to record fleet event")
                }
            }
        }
        debug!(recorded, "fleet event channel closed");
        recorded
    }

    /// Handles one event. Returns whether a record was stored.
    pub async fn record(&self, event: &FleetEvent) -> Result<bool, StorageError> {
        let routing_key = event.routing_key();
        match serde_json::to_string(event) {
            Ok(payload) => info!(routing_key, %payload, "fleet event received"),
            Err(e) => warn!(routing_key, error = %e, "fleet event could not be encoded"),
        }

        let Some(record) = MotorcycleEventRecord::from_highlight(event, self.clock.today()) else {
            return Ok(false);
        };
        self.store
            .apply_all(vec![Write::RecordEvent(record)])
            .await?;
        Ok(true)
    }
}
