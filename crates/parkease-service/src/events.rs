//! Live parking record events.
//!
//! Handlers publish an event after each successful record write; WebSocket
//! subscribers receive the events of their own branch.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use parkease_core::{BranchId, ParkingRecord};

/// Capacity of the event channel. Subscribers that fall further behind skip
/// the oldest events.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// What happened to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordEventKind {
    /// A vehicle entered.
    Entered,
    /// A session was paid.
    Completed,
}

/// A record change pushed to live subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEvent {
    /// Kind of change.
    pub kind: RecordEventKind,
    /// The record after the change.
    pub record: ParkingRecord,
}

impl RecordEvent {
    /// Whether the event belongs to `branch_id`.
    #[must_use]
    pub fn is_for(&self, branch_id: &BranchId) -> bool {
        &self.record.branch_id == branch_id
    }
}

/// Broadcast hub for record events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RecordEvent>,
}

impl EventBus {
    /// Create a bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: RecordEvent) {
        let receivers = self.sender.send(event).unwrap_or(0);
        tracing::trace!(receivers, "Published record event");
    }

    /// Subscribe to all subsequent events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RecordEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(branch: &str) -> RecordEvent {
        RecordEvent {
            kind: RecordEventKind::Entered,
            record: ParkingRecord::enter(
                branch.parse().unwrap(),
                "ABC-123".parse().unwrap(),
                chrono::Utc::now(),
            ),
        }
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        EventBus::default().publish(event("lot-a"));
    }

    #[tokio::test]
    async fn subscribers_receive_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let sent = event("lot-a");
        bus.publish(sent.clone());

        assert_eq!(rx.recv().await.unwrap(), sent);
    }

    #[test]
    fn events_are_scoped_to_branch() {
        let e = event("lot-a");
        assert!(e.is_for(&"lot-a".parse().unwrap()));
        assert!(!e.is_for(&"lot-b".parse().unwrap()));
    }

    #[test]
    fn serializes_kind_in_snake_case() {
        let value = serde_json::to_value(event("lot-a")).unwrap();
        assert_eq!(value["kind"], "entered");
        assert_eq!(value["record"]["status"], "parked");
    }
}
