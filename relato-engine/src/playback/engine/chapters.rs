//! Chapter selection and navigation

use super::PlayerEngine;
use crate::error::Result;
use crate::playback::resume;
use crate::playback::session::PlayerTrack;
use relato_common::{Book, Chapter, PlayerEvent};
use std::sync::atomic::Ordering;
use tracing::{debug, info};

impl PlayerEngine {
    /// Play a specific chapter of a book
    ///
    /// Starts from the beginning immediately; if the catalog has a bookmark
    /// for this exact chapter, the position is applied as soon as the lookup
    /// returns, unless another chapter has been loaded in the meantime.
    pub async fn play_chapter(&self, track: PlayerTrack) -> Result<()> {
        let chapter_id = track
            .chapters
            .get(track.index)
            .map(|c| c.id)
            .unwrap_or_default();
        let book_id = track.book_id;

        self.load_track(track, None, true).await?;

        let generation = self.generation.load(Ordering::SeqCst);
        let me = self.me.clone();
        let voice = self.config.voice.clone();
        let style = self.config.style.clone();
        tokio::spawn(async move {
            let Some(engine) = me.upgrade() else { return };
            match engine.catalog.get_continue(book_id, &voice, &style).await {
                Ok(payload) => {
                    let offset = payload
                        .bookmark
                        .filter(|b| b.chapter_id == chapter_id)
                        .map(|b| b.position_seconds as f64);
                    if let Some(offset) = offset {
                        engine.apply_resume_offset(generation, offset).await;
                    }
                }
                Err(e) => {
                    debug!(book_id = %book_id, "Continue lookup after chapter pick failed: {}", e);
                }
            }
        });

        Ok(())
    }

    /// Resume a book where the user left off
    ///
    /// The continue lookup can be slow; if another chapter gets loaded while
    /// it is in flight, the resolution is stale and is dropped.
    pub async fn resume_book(&self, book: Book, chapters: Vec<Chapter>) -> Result<()> {
        let issued = self.generation.load(Ordering::SeqCst);

        let target = resume::resolve(
            self.catalog.as_ref(),
            book.id,
            &chapters,
            &self.config.voice,
            &self.config.style,
        )
        .await?;

        if self.generation.load(Ordering::SeqCst) != issued {
            debug!(book = %book.title, "Discarding superseded resume resolution");
            return Ok(());
        }

        self.load_track(
            PlayerTrack {
                book_id: book.id,
                book_title: book.title,
                cover_url: book.cover_url,
                chapters,
                index: target.chapter_index,
            },
            (target.offset_seconds > 0.0).then_some(target.offset_seconds),
            true,
        )
        .await
    }

    /// Advance to the next chapter; announces end of book past the last one
    pub async fn next(&self) -> Result<()> {
        let Some(session) = self.session.read().await.clone() else {
            return Ok(());
        };

        let next_index = session.active_index + 1;
        if next_index >= session.chapters.len() {
            info!(book = %session.book_title, "End of book");
            self.state.broadcast_event(PlayerEvent::EndOfBook {
                book_id: session.book_id,
                timestamp: chrono::Utc::now(),
            });
            return Ok(());
        }

        self.load_track(
            PlayerTrack {
                book_id: session.book_id,
                book_title: session.book_title,
                cover_url: session.cover_url,
                chapters: session.chapters,
                index: next_index,
            },
            None,
            true,
        )
        .await
    }

    /// Go back one chapter; no-op at the first
    pub async fn prev(&self) -> Result<()> {
        let Some(session) = self.session.read().await.clone() else {
            return Ok(());
        };
        if session.active_index == 0 {
            return Ok(());
        }

        self.load_track(
            PlayerTrack {
                book_id: session.book_id,
                book_title: session.book_title,
                cover_url: session.cover_url,
                chapters: session.chapters,
                index: session.active_index - 1,
            },
            None,
            true,
        )
        .await
    }
}
