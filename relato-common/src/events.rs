//! Event types for the Relato playback engine
//!
//! Provides the player event definitions and the EventBus that fans them out
//! to UI shells, media-session bridges, and tests.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Playback session lifecycle states
///
/// `Loading` covers the window between handing a chapter to the audio adapter
/// and the adapter reporting metadata. `Ready` means loaded but never started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PlayerState::Idle => "idle",
            PlayerState::Loading => "loading",
            PlayerState::Ready => "ready",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Ended => "ended",
        };
        write!(f, "{}", s)
    }
}

/// Relato player event types
///
/// Events are broadcast via EventBus and can be serialized for transmission
/// to whatever host surface is attached (UI, media session, remote bridge).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Player state changed (Idle/Loading/Ready/Playing/Paused/Ended)
    ///
    /// Triggers:
    /// - UI: Update transport controls
    /// - Media session: Update playback status
    StateChanged {
        /// State before change
        old_state: PlayerState,
        /// State after change
        new_state: PlayerState,
        /// When state changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback position update
    ///
    /// Emitted on every adapter time sample (default: every 250ms while
    /// playing) and once immediately on play/pause so UIs never show a stale
    /// position.
    Progress {
        /// Book being played
        book_id: Uuid,
        /// Chapter being played
        chapter_id: Uuid,
        /// Current position in seconds
        position_seconds: f64,
        /// Chapter duration in seconds (0.0 until metadata is known)
        duration_seconds: f64,
        /// Whether audio is advancing
        playing: bool,
        /// When the sample was taken
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Active chapter changed (load, next/prev, resume)
    ///
    /// Triggers:
    /// - UI: Update now-playing display
    /// - Media session: Update track metadata
    ChapterChanged {
        /// Book being played
        book_id: Uuid,
        /// Newly active chapter
        chapter_id: Uuid,
        /// Zero-based index within the book
        chapter_index: usize,
        /// Display label for the chapter
        title: String,
        /// When the chapter changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Last chapter finished; nothing further to advance to
    EndOfBook {
        /// Book that finished
        book_id: Uuid,
        /// When the book ended
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A chapter without generated narration was asked to play
    MediaUnavailable {
        /// Chapter that has no audio
        chapter_id: Uuid,
        /// When the attempt was made
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The audio adapter reported a load or decode failure
    DecodeFailed {
        /// Chapter being loaded when the failure occurred (if known)
        chapter_id: Option<Uuid>,
        /// Adapter error message
        message: String,
        /// When the failure occurred
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback rate changed
    ///
    /// Triggers:
    /// - UI: Update rate selector
    /// - Prefs: Persist the device rate preference
    RateChanged {
        /// Rate before change
        old_rate: f64,
        /// Rate after change
        new_rate: f64,
        /// When the rate changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Sleep timer deadline passed; playback was paused
    SleepTimerElapsed {
        /// When the timer fired
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            PlayerEvent::StateChanged { .. } => "StateChanged",
            PlayerEvent::Progress { .. } => "Progress",
            PlayerEvent::ChapterChanged { .. } => "ChapterChanged",
            PlayerEvent::EndOfBook { .. } => "EndOfBook",
            PlayerEvent::MediaUnavailable { .. } => "MediaUnavailable",
            PlayerEvent::DecodeFailed { .. } => "DecodeFailed",
            PlayerEvent::RateChanged { .. } => "RateChanged",
            PlayerEvent::SleepTimerElapsed { .. } => "SleepTimerElapsed",
        }
    }
}

/// Central event distribution bus for player events
///
/// Wraps tokio::broadcast, providing:
/// - Non-blocking publish (slow subscribers don't block the engine)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    ///
    /// `capacity` is the number of events buffered before old events are
    /// dropped for lagging subscribers. 100 is plenty for a single player;
    /// tests can get away with 10.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` when no one is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PlayerEvent,
    ) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring whether anyone is listening
    ///
    /// Used for high-frequency events (position samples) where a missing
    /// subscriber is normal.
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_bus_reports_capacity_and_subscribers() {
        let bus = EventBus::new(16);
        assert_eq!(bus.capacity(), 16);
        assert_eq!(bus.subscriber_count(), 0);

        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn emit_fails_without_subscribers_and_lossy_does_not_panic() {
        let bus = EventBus::new(8);
        let event = PlayerEvent::SleepTimerElapsed {
            timestamp: chrono::Utc::now(),
        };
        assert!(bus.emit(event.clone()).is_err());
        bus.emit_lossy(event);
    }

    #[tokio::test]
    async fn subscriber_receives_emitted_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.emit(PlayerEvent::StateChanged {
            old_state: PlayerState::Idle,
            new_state: PlayerState::Loading,
            timestamp: chrono::Utc::now(),
        })
        .expect("one subscriber");

        let event = rx.recv().await.expect("event");
        assert_eq!(event.event_type(), "StateChanged");
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = PlayerEvent::EndOfBook {
            book_id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "EndOfBook");
    }

    #[test]
    fn player_state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PlayerState::Playing).expect("serialize"),
            "\"playing\""
        );
        assert_eq!(PlayerState::Ended.to_string(), "ended");
    }
}
