//! Resume resolution
//!
//! Decides where playback of a book starts: the recorded continue position
//! when it still points at a playable chapter, otherwise the first chapter
//! with audio. A failed continue lookup degrades to the fallback rather
//! than failing the whole resume.

use crate::catalog::CatalogApi;
use crate::error::{Error, Result};
use relato_common::Chapter;
use tracing::{debug, warn};
use uuid::Uuid;

/// Where playback of a book should start
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeTarget {
    pub chapter_index: usize,
    pub offset_seconds: f64,
}

/// Resolve the starting chapter and offset for a book
pub async fn resolve(
    catalog: &dyn CatalogApi,
    book_id: Uuid,
    chapters: &[Chapter],
    voice: &str,
    style: &str,
) -> Result<ResumeTarget> {
    let payload = match catalog.get_continue(book_id, voice, style).await {
        Ok(payload) => payload,
        Err(e) => {
            warn!(book_id = %book_id, "Continue lookup failed, starting from the beginning: {}", e);
            Default::default()
        }
    };

    // Prefer the chapter the backend names; fall back to the bookmark's.
    let candidate_id = payload
        .chapter
        .as_ref()
        .map(|c| c.id)
        .or_else(|| payload.bookmark.as_ref().map(|b| b.chapter_id));

    if let Some(candidate_id) = candidate_id {
        let found = chapters
            .iter()
            .position(|c| c.id == candidate_id && c.has_audio());
        if let Some(chapter_index) = found {
            let offset_seconds = payload
                .bookmark
                .as_ref()
                .filter(|b| b.chapter_id == candidate_id)
                .map(|b| b.position_seconds as f64)
                .unwrap_or(0.0);
            debug!(book_id = %book_id, chapter_index, offset_seconds, "Resuming from continue record");
            return Ok(ResumeTarget {
                chapter_index,
                offset_seconds,
            });
        }
        debug!(book_id = %book_id, %candidate_id, "Continue record points at an unplayable chapter");
    }

    match chapters.iter().position(|c| c.has_audio()) {
        Some(chapter_index) => Ok(ResumeTarget {
            chapter_index,
            offset_seconds: 0.0,
        }),
        None => Err(Error::NoAudioAvailable(book_id)),
    }
}
