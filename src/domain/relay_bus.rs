//! Broadcast channel feeding the chat relay.
//!
//! [`RelayBus`] wraps a [`tokio::sync::broadcast`] channel. Every stored chat
//! message is published once; each WebSocket task holds a receiver and keeps
//! only the events addressed to the user its socket is tagged with.

use tokio::sync::broadcast;

use super::RelayEvent;

/// Broadcast bus for [`RelayEvent`]s.
///
/// When the ring buffer is full the oldest events are dropped for lagging
/// receivers. Nothing is replayed; clients fall back to polling.
#[derive(Debug, Clone)]
pub struct RelayBus {
    sender: broadcast::Sender<RelayEvent>,
}

impl RelayBus {
    /// Creates a new `RelayBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to every connected socket task.
    ///
    /// Returns the number of receivers that saw the event; with no sockets
    /// connected the event is dropped and `0` is returned.
    pub fn publish(&self, event: RelayEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a receiver for all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of live receivers, i.e. open sockets.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ChatMessage, OrderId, UserId};
    use chrono::Utc;

    fn make_event(to: &str) -> RelayEvent {
        RelayEvent::NewMessage(ChatMessage::new(
            OrderId::new(),
            UserId::new("sender"),
            UserId::new(to),
            "hi".to_string(),
            None,
            Utc::now(),
        ))
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = RelayBus::new(16);
        assert_eq!(bus.publish(make_event("a")), 0);
    }

    #[tokio::test]
    async fn every_receiver_sees_every_event() {
        let bus = RelayBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.publish(make_event("a")), 2);

        let Ok(e1) = rx1.recv().await else {
            panic!("rx1 failed");
        };
        let Ok(e2) = rx2.recv().await else {
            panic!("rx2 failed");
        };
        assert_eq!(e1.recipient(), e2.recipient());
    }

    #[tokio::test]
    async fn events_arrive_in_publish_order() {
        let bus = RelayBus::new(16);
        let mut rx = bus.subscribe();
        bus.publish(make_event("first"));
        bus.publish(make_event("second"));

        let Ok(a) = rx.recv().await else {
            panic!("recv failed");
        };
        let Ok(b) = rx.recv().await else {
            panic!("recv failed");
        };
        assert_eq!(a.recipient().as_str(), "first");
        assert_eq!(b.recipient().as_str(), "second");
    }

    #[test]
    fn receiver_count_tracks_sockets() {
        let bus = RelayBus::new(16);
        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);
        drop(rx1);
        assert_eq!(bus.receiver_count(), 1);
    }
}
