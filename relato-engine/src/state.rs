//! Shared playback state
//!
//! Thread-safe state shared between the engine, the position tracker, and
//! whatever host surface is attached.

use relato_common::{Chapter, EventBus, PlayerEvent, PlayerState};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Identity of what is currently loaded
#[derive(Debug, Clone)]
pub struct NowPlaying {
    pub book_id: Uuid,
    pub book_title: String,
    pub cover_url: Option<String>,
    pub chapter_id: Uuid,
    pub chapter_index: usize,
    pub chapter_title: String,
}

/// Shared state accessible by all components
///
/// Uses RwLock for concurrent read access with rare writes.
pub struct SharedState {
    /// Current player state
    pub playback_state: RwLock<PlayerState>,

    /// Identity of the loaded chapter (None when idle)
    pub now_playing: RwLock<Option<NowPlaying>>,

    /// Last observed (position, duration) in seconds
    pub position: RwLock<(f64, f64)>,

    /// Current playback rate
    pub rate: RwLock<f64>,

    /// Sleep timer deadline, if armed
    pub sleep_target: RwLock<Option<tokio::time::Instant>>,

    /// Event broadcaster for host surfaces
    pub event_bus: EventBus,
}

impl SharedState {
    /// Create new shared state
    pub fn new(event_capacity: usize, initial_rate: f64) -> Self {
        Self {
            playback_state: RwLock::new(PlayerState::Idle),
            now_playing: RwLock::new(None),
            position: RwLock::new((0.0, 0.0)),
            rate: RwLock::new(initial_rate),
            sleep_target: RwLock::new(None),
            event_bus: EventBus::new(event_capacity),
        }
    }

    /// Broadcast an event to all listeners
    pub fn broadcast_event(&self, event: PlayerEvent) {
        // No receivers is OK
        self.event_bus.emit_lossy(event);
    }

    /// Subscribe to the event stream
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_bus.subscribe()
    }

    /// Get current player state
    pub async fn get_playback_state(&self) -> PlayerState {
        *self.playback_state.read().await
    }

    /// Set player state
    pub async fn set_playback_state(&self, state: PlayerState) {
        *self.playback_state.write().await = state;
    }

    /// Get the loaded chapter identity
    pub async fn get_now_playing(&self) -> Option<NowPlaying> {
        self.now_playing.read().await.clone()
    }

    /// Set the loaded chapter identity
    pub async fn set_now_playing(&self, now: Option<NowPlaying>) {
        *self.now_playing.write().await = now;
    }

    /// Get (position, duration) in seconds
    pub async fn get_position(&self) -> (f64, f64) {
        *self.position.read().await
    }

    /// Set (position, duration) in seconds
    pub async fn set_position(&self, position: f64, duration: f64) {
        *self.position.write().await = (position, duration);
    }

    /// Get current playback rate
    pub async fn get_rate(&self) -> f64 {
        *self.rate.read().await
    }

    /// Set playback rate (caller clamps)
    pub async fn set_rate(&self, rate: f64) {
        *self.rate.write().await = rate;
    }

    /// Get the sleep timer deadline
    pub async fn get_sleep_target(&self) -> Option<tokio::time::Instant> {
        *self.sleep_target.read().await
    }

    /// Arm or clear the sleep timer
    pub async fn set_sleep_target(&self, target: Option<tokio::time::Instant>) {
        *self.sleep_target.write().await = target;
    }
}

/// Point-in-time view of the player for host surfaces
///
/// Everything a UI needs to render transport controls and a now-playing
/// card without further queries.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub state: PlayerState,
    /// Whether the loaded chapter has playable audio
    pub has_audio: bool,
    pub playing: bool,
    pub position: f64,
    pub duration: f64,
    pub rate: f64,
    /// Book title, or None when idle
    pub now_title: Option<String>,
    /// Chapter line, e.g. "3. The Storm"
    pub now_subtitle: Option<String>,
    pub chapter_index: Option<usize>,
    pub chapters: Vec<Chapter>,
    pub cover_url: Option<String>,
    /// Whole seconds until the sleep timer fires, if armed
    pub sleep_remaining_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn playback_state_defaults_to_idle() {
        let state = SharedState::new(10, 1.0);
        assert_eq!(state.get_playback_state().await, PlayerState::Idle);

        state.set_playback_state(PlayerState::Playing).await;
        assert_eq!(state.get_playback_state().await, PlayerState::Playing);
    }

    #[tokio::test]
    async fn position_roundtrip() {
        let state = SharedState::new(10, 1.0);
        assert_eq!(state.get_position().await, (0.0, 0.0));

        state.set_position(42.5, 300.0).await;
        assert_eq!(state.get_position().await, (42.5, 300.0));
    }

    #[tokio::test]
    async fn now_playing_roundtrip() {
        let state = SharedState::new(10, 1.0);
        assert!(state.get_now_playing().await.is_none());

        let now = NowPlaying {
            book_id: Uuid::new_v4(),
            book_title: "A Book".to_string(),
            cover_url: None,
            chapter_id: Uuid::new_v4(),
            chapter_index: 2,
            chapter_title: "Chapter 3".to_string(),
        };
        state.set_now_playing(Some(now.clone())).await;

        let got = state.get_now_playing().await.expect("set");
        assert_eq!(got.chapter_index, 2);
        assert_eq!(got.book_title, "A Book");
    }
}
