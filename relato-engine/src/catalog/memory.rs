//! In-memory catalog
//!
//! Used by the demo binary and the test suites. Supports failure injection
//! and an artificial continue-lookup delay so slow-backend races can be
//! reproduced deterministically.

use crate::catalog::CatalogApi;
use crate::error::{Error, Result};
use async_trait::async_trait;
use relato_common::{Bookmark, ContinuePayload};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

/// In-process catalog implementation
#[derive(Default)]
pub struct MemoryCatalog {
    continues: Mutex<HashMap<Uuid, ContinuePayload>>,
    saved: Mutex<Vec<Bookmark>>,
    save_count: AtomicUsize,
    fail_saves: AtomicBool,
    fail_continue: AtomicBool,
    continue_delay: Mutex<Option<Duration>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the continue record for a book
    pub fn set_continue(&self, book_id: Uuid, payload: ContinuePayload) {
        if let Ok(mut continues) = self.continues.lock() {
            continues.insert(book_id, payload);
        }
    }

    /// Make every bookmark write fail
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Make every continue lookup fail
    pub fn fail_continue(&self, fail: bool) {
        self.fail_continue.store(fail, Ordering::SeqCst);
    }

    /// Delay continue lookups to simulate a slow backend
    pub fn set_continue_delay(&self, delay: Option<Duration>) {
        if let Ok(mut d) = self.continue_delay.lock() {
            *d = delay;
        }
    }

    /// Bookmarks written so far, oldest first
    pub fn saved_bookmarks(&self) -> Vec<Bookmark> {
        self.saved.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of bookmark writes attempted (including failed ones)
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogApi for MemoryCatalog {
    async fn get_continue(
        &self,
        book_id: Uuid,
        _voice: &str,
        _style: &str,
    ) -> Result<ContinuePayload> {
        let delay = self.continue_delay.lock().ok().and_then(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_continue.load(Ordering::SeqCst) {
            return Err(Error::Network("continue lookup failed".to_string()));
        }

        let payload = self
            .continues
            .lock()
            .ok()
            .and_then(|c| c.get(&book_id).cloned())
            .unwrap_or_default();
        Ok(payload)
    }

    async fn save_bookmark(
        &self,
        book_id: Uuid,
        chapter_id: Uuid,
        position_seconds: u64,
        voice: &str,
        style: &str,
    ) -> Result<()> {
        self.save_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::Network("bookmark write failed".to_string()));
        }

        if let Ok(mut saved) = self.saved.lock() {
            saved.push(Bookmark {
                book_id,
                chapter_id,
                position_seconds,
                voice: voice.to_string(),
                style: style.to_string(),
                updated_at: chrono::Utc::now(),
            });
        }
        Ok(())
    }

    async fn recap_chapter(
        &self,
        _book_id: Uuid,
        chapter_id: Uuid,
        position_seconds: u64,
        style: &str,
    ) -> Result<String> {
        Ok(format!(
            "Recap of chapter {} up to {}s ({} style)",
            chapter_id, position_seconds, style
        ))
    }
}
