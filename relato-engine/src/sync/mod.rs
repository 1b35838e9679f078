//! Cross-session transport sync
//!
//! Sessions of the same user mirror play, pause, and seek through a shared
//! channel. Events carry the origin session id so a session can ignore its
//! own traffic coming back around.

mod local;

pub use local::LocalSyncBus;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Kind of transport action being mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncKind {
    Play,
    Pause,
    Seek,
}

/// A transport action published by one session for the others
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEvent {
    pub kind: SyncKind,
    /// Session that performed the action
    pub origin: Uuid,
    /// Position in seconds at the time of the action
    pub position: f64,
    pub timestamp: DateTime<Utc>,
}

/// Transport channel between sessions
///
/// Implementations may loop published events back to the publisher's own
/// subscribers; receivers filter by origin.
pub trait SyncChannel: Send + Sync {
    /// Publish an event to all sessions
    fn publish(&self, event: SyncEvent);

    /// Subscribe to events from all sessions
    fn subscribe(&self) -> broadcast::Receiver<SyncEvent>;
}
