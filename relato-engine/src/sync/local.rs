//! In-process sync channel
//!
//! Broadcast-backed channel connecting sessions within one process. Faithful
//! to shared transports in one important way: a publisher's own events come
//! back to its subscribers, so origin filtering actually gets exercised.

use crate::sync::{SyncChannel, SyncEvent};
use tokio::sync::broadcast;

/// Broadcast-backed sync channel
#[derive(Clone)]
pub struct LocalSyncBus {
    tx: broadcast::Sender<SyncEvent>,
}

impl LocalSyncBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Number of subscribed sessions
    pub fn session_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for LocalSyncBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl SyncChannel for LocalSyncBus {
    fn publish(&self, event: SyncEvent) {
        // No sessions listening is fine
        let _ = self.tx.send(event);
    }

    fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncKind;
    use uuid::Uuid;

    #[tokio::test]
    async fn publisher_receives_its_own_events() {
        let bus = LocalSyncBus::new(8);
        let mut rx = bus.subscribe();

        let origin = Uuid::new_v4();
        bus.publish(SyncEvent {
            kind: SyncKind::Play,
            origin,
            position: 10.0,
            timestamp: chrono::Utc::now(),
        });

        let event = rx.recv().await.expect("event");
        assert_eq!(event.origin, origin);
        assert_eq!(event.kind, SyncKind::Play);
    }

    #[tokio::test]
    async fn all_subscribers_see_each_event() {
        let bus = LocalSyncBus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.session_count(), 2);

        bus.publish(SyncEvent {
            kind: SyncKind::Seek,
            origin: Uuid::new_v4(),
            position: 99.0,
            timestamp: chrono::Utc::now(),
        });

        assert_eq!(a.recv().await.expect("a").position, 99.0);
        assert_eq!(b.recv().await.expect("b").position, 99.0);
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let bus = LocalSyncBus::new(8);
        bus.publish(SyncEvent {
            kind: SyncKind::Pause,
            origin: Uuid::new_v4(),
            position: 0.0,
            timestamp: chrono::Utc::now(),
        });
    }
}
