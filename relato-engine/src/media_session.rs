//! Media-session bridge
//!
//! Adapts the engine to a platform media surface (lock screen, hardware
//! keys, car display): exposes now-playing metadata and forwards host
//! transport commands. Stateless; everything comes from the engine
//! snapshot.

use crate::playback::PlayerEngine;
use std::sync::Arc;

/// Metadata a platform media surface displays
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlayingMetadata {
    pub book_title: String,
    pub chapter_title: String,
    pub chapter_index: usize,
    pub chapter_count: usize,
    pub artwork_url: Option<String>,
}

/// Transport commands arriving from the platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCommand {
    Play,
    Pause,
    Toggle,
    SeekTo(f64),
    SeekBy(f64),
    Next,
    Previous,
}

/// Bridge between the engine and a platform media session
pub struct MediaSessionBridge {
    engine: Arc<PlayerEngine>,
}

impl MediaSessionBridge {
    pub fn new(engine: Arc<PlayerEngine>) -> Self {
        Self { engine }
    }

    /// Metadata for the platform surface, or None when nothing is loaded
    pub async fn now_playing(&self) -> Option<NowPlayingMetadata> {
        let snapshot = self.engine.snapshot().await;
        let chapter_index = snapshot.chapter_index?;
        let book_title = snapshot.now_title?;

        let chapter_title = snapshot
            .chapters
            .get(chapter_index)
            .map(|c| c.label())
            .unwrap_or_else(|| format!("Chapter {}", chapter_index + 1));

        Some(NowPlayingMetadata {
            book_title,
            chapter_title,
            chapter_index,
            chapter_count: snapshot.chapters.len(),
            artwork_url: snapshot.cover_url,
        })
    }

    /// Dispatch a platform transport command to the engine
    ///
    /// Navigation failures (e.g. next into a chapter without audio) surface
    /// as player events, not here; media keys have no error channel.
    pub async fn handle(&self, command: HostCommand) {
        match command {
            HostCommand::Play => self.engine.play().await,
            HostCommand::Pause => self.engine.pause().await,
            HostCommand::Toggle => self.engine.toggle().await,
            HostCommand::SeekTo(seconds) => self.engine.seek_to(seconds).await,
            HostCommand::SeekBy(delta) => self.engine.seek_by(delta).await,
            HostCommand::Next => {
                let _ = self.engine.next().await;
            }
            HostCommand::Previous => {
                let _ = self.engine.prev().await;
            }
        }
    }
}
