//! Catalog data model
//!
//! Read-only snapshots of catalog entities consumed by the playback engine.
//! Book and chapter management lives in the backend; these types only carry
//! what playback needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A book in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    /// Cover image URL, when the catalog has one
    #[serde(default)]
    pub cover_url: Option<String>,
}

/// A chapter snapshot from the catalog
///
/// A chapter whose `audio_url` is `None` has no generated narration yet and
/// cannot be played.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: Uuid,
    /// Zero-based position within the book
    pub index_in_book: u32,
    pub title: Option<String>,
    /// Reference to the playable audio resource, if narration exists
    pub audio_url: Option<String>,
    /// Narration voice the audio was generated with
    #[serde(default)]
    pub voice: Option<String>,
    /// Narration style the audio was generated with
    #[serde(default)]
    pub style: Option<String>,
}

impl Chapter {
    /// Whether this chapter can be played at all
    pub fn has_audio(&self) -> bool {
        self.audio_url.is_some()
    }

    /// Display label, falling back to a numbered chapter name for untitled
    /// chapters
    pub fn label(&self) -> String {
        match &self.title {
            Some(t) if !t.is_empty() => t.clone(),
            _ => format!("Chapter {}", self.index_in_book + 1),
        }
    }
}

/// Durable record of the last playback position for a
/// (book, chapter, voice, style) tuple
///
/// Monotonic in intent only: an explicit user seek backward is a legitimate
/// overwrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub book_id: Uuid,
    pub chapter_id: Uuid,
    pub position_seconds: u64,
    pub voice: String,
    pub style: String,
    pub updated_at: DateTime<Utc>,
}

/// Response of the catalog "continue" lookup for a book
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContinuePayload {
    /// Last known position, if the user has listened before
    pub bookmark: Option<Bookmark>,
    /// Chapter the backend suggests resuming in (usually the bookmarked one)
    pub chapter: Option<Chapter>,
}
