//! Throttled bookmark persistence
//!
//! Position samples arrive several times a second; the catalog only needs a
//! bookmark every couple of seconds. Writes are throttled per
//! (book, chapter, voice, style) key, dispatched fire-and-forget, and
//! failures never surface beyond a log line. A lost bookmark write costs
//! the user a few seconds of position at worst.

use crate::catalog::CatalogApi;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Identity a bookmark is stored under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookmarkKey {
    pub book_id: Uuid,
    pub chapter_id: Uuid,
    pub voice: String,
    pub style: String,
}

/// Throttled writer of playback positions to the catalog
pub struct BookmarkPersister {
    catalog: Arc<dyn CatalogApi>,
    window: Duration,
    last_write: Mutex<HashMap<BookmarkKey, Instant>>,
}

impl BookmarkPersister {
    pub fn new(catalog: Arc<dyn CatalogApi>, window: Duration) -> Self {
        Self {
            catalog,
            window,
            last_write: Mutex::new(HashMap::new()),
        }
    }

    /// Record a position sample, writing if the throttle window has passed
    pub async fn notify(&self, key: &BookmarkKey, position_seconds: f64) {
        let now = Instant::now();
        {
            let mut last_write = self.last_write.lock().await;
            if let Some(last) = last_write.get(key) {
                if now.duration_since(*last) < self.window {
                    return;
                }
            }
            last_write.insert(key.clone(), now);
        }
        self.dispatch(key.clone(), position_seconds);
    }

    /// Write immediately, bypassing the throttle (pause, chapter switch,
    /// shutdown)
    pub async fn write_now(&self, key: &BookmarkKey, position_seconds: f64) {
        self.last_write
            .lock()
            .await
            .insert(key.clone(), Instant::now());
        self.dispatch(key.clone(), position_seconds);
    }

    fn dispatch(&self, key: BookmarkKey, position_seconds: f64) {
        let catalog = Arc::clone(&self.catalog);
        let position = position_seconds.max(0.0).floor() as u64;
        tokio::spawn(async move {
            match catalog
                .save_bookmark(key.book_id, key.chapter_id, position, &key.voice, &key.style)
                .await
            {
                Ok(()) => {
                    debug!(chapter_id = %key.chapter_id, position, "Bookmark saved");
                }
                Err(e) => {
                    warn!(chapter_id = %key.chapter_id, position, "Bookmark write failed: {}", e);
                }
            }
        });
    }
}
