//! Position tracking
//!
//! Folds adapter time samples into shared state, feeds the bookmark
//! persister, and watches the sleep timer deadline.

use crate::playback::persister::{BookmarkKey, BookmarkPersister};
use crate::state::SharedState;
use std::sync::Arc;

/// Consumer of adapter time samples
pub struct PositionTracker {
    state: Arc<SharedState>,
    persister: Arc<BookmarkPersister>,
}

impl PositionTracker {
    pub fn new(state: Arc<SharedState>, persister: Arc<BookmarkPersister>) -> Self {
        Self { state, persister }
    }

    /// Process one time sample
    ///
    /// Returns true when the sleep timer deadline has passed; the caller
    /// owns pausing and announcing it. The deadline is cleared here so the
    /// timer fires once.
    pub async fn on_sample(
        &self,
        key: Option<BookmarkKey>,
        position: f64,
        duration: f64,
        playing: bool,
    ) -> bool {
        self.state.set_position(position, duration).await;

        if playing {
            if let Some(key) = key {
                self.persister.notify(&key, position).await;
            }
        }

        if let Some(target) = self.state.get_sleep_target().await {
            if tokio::time::Instant::now() >= target {
                self.state.set_sleep_target(None).await;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogApi, MemoryCatalog};
    use std::time::Duration;
    use uuid::Uuid;

    fn tracker() -> (PositionTracker, Arc<SharedState>, Arc<MemoryCatalog>) {
        let state = Arc::new(SharedState::new(10, 1.0));
        let catalog = Arc::new(MemoryCatalog::new());
        let persister = Arc::new(BookmarkPersister::new(
            catalog.clone() as Arc<dyn CatalogApi>,
            Duration::from_millis(1500),
        ));
        (
            PositionTracker::new(state.clone(), persister),
            state,
            catalog,
        )
    }

    fn key() -> BookmarkKey {
        BookmarkKey {
            book_id: Uuid::new_v4(),
            chapter_id: Uuid::new_v4(),
            voice: "onyx".to_string(),
            style: "learning".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sample_updates_shared_position() {
        let (tracker, state, _catalog) = tracker();
        let slept = tracker.on_sample(Some(key()), 12.5, 300.0, true).await;
        assert!(!slept);
        assert_eq!(state.get_position().await, (12.5, 300.0));
    }

    #[tokio::test(start_paused = true)]
    async fn paused_samples_do_not_persist() {
        let (tracker, _state, catalog) = tracker();
        tracker.on_sample(Some(key()), 12.5, 300.0, false).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(catalog.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_deadline_fires_once() {
        let (tracker, state, _catalog) = tracker();
        state
            .set_sleep_target(Some(
                tokio::time::Instant::now() + Duration::from_secs(60),
            ))
            .await;

        assert!(!tracker.on_sample(None, 1.0, 300.0, true).await);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(tracker.on_sample(None, 62.0, 300.0, true).await);
        // Deadline cleared, later samples don't re-fire
        assert!(!tracker.on_sample(None, 63.0, 300.0, true).await);
    }
}
