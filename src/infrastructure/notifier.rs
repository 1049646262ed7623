use crate::domain::events::FleetEvent;
use crate::domain::ports::EventNotifier;
use crate::error::NotifyError;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Publishes fleet events as structured log records.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl EventNotifier for LogNotifier {
    async fn publish(&self, event: FleetEvent) -> Result<(), NotifyError> {
        let payload = serde_json::to_string(&event)?;
        tracing::info!(routing_key = event.routing_key(), %payload, "fleet event published");
        Ok(())
    }
}

/// Forwards fleet events to an in-process consumer.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<FleetEvent>,
}

impl ChannelNotifier {
    /// Creates a notifier and the receiving end its events are delivered to.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FleetEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EventNotifier for ChannelNotifier {
    async fn publish(&self, event: FleetEvent) -> Result<(), NotifyError> {
        self.sender
            .send(event)
            .map_err(|_| NotifyError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::motorcycle::MotorcycleId;

    fn event() -> FleetEvent {
        FleetEvent::MotorcycleRegistered {
            id: MotorcycleId(1),
            plate: "CHN0A01".to_string(),
            year: 2021,
        }
    }

    #[tokio::test]
    async fn test_channel_notifier_delivers() {
        let (notifier, mut receiver) = ChannelNotifier::new();
        notifier.publish(event()).await.unwrap();
        assert_eq!(receiver.recv().await, Some(event()));
    }

    #[tokio::test]
    async fn test_channel_notifier_reports_closed_channel() {
        let (notifier, receiver) = ChannelNotifier::new();
        drop(receiver);
        assert!(matches!(
            notifier.publish(event()).await,
            Err(NotifyError::ChannelClosed)
        ));
    }

    #[tokio::test]
    async fn test_log_notifier_accepts_events() {
        assert!(LogNotifier.publish(event()).await.is_ok());
    }
}
