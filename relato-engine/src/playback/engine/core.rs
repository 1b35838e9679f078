//! Engine construction, event loops, and chapter loading

use crate::audio::{AdapterEvent, AdapterEventReceiver, AudioAdapter};
use crate::catalog::CatalogApi;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::playback::persister::{BookmarkKey, BookmarkPersister};
use crate::playback::session::{PlaybackSession, PlayerTrack};
use crate::playback::tracker::PositionTracker;
use crate::prefs::DevicePrefs;
use crate::state::{NowPlaying, PlayerSnapshot, SharedState};
use crate::sync::{SyncChannel, SyncEvent, SyncKind};
use relato_common::{PlayerEvent, PlayerState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A load handed to the adapter whose metadata has not arrived yet
///
/// The seek (if any) is applied only once metadata confirms the duration,
/// and only if the generation still matches.
pub(super) struct PendingLoad {
    pub generation: u64,
    pub seek: Option<f64>,
    pub autoplay: bool,
}

/// The playback session controller
///
/// All commands are `&self`; the engine is shared behind an `Arc` between
/// the host surface and its own spawned event loops.
pub struct PlayerEngine {
    pub(super) config: EngineConfig,
    pub(super) state: Arc<SharedState>,
    pub(super) session: RwLock<Option<PlaybackSession>>,

    /// Bumped on every chapter load; stale async continuations compare
    /// their captured value against this and bail
    pub(super) generation: AtomicU64,

    pub(super) adapter: Arc<dyn AudioAdapter>,
    pub(super) catalog: Arc<dyn CatalogApi>,
    pub(super) sync: Arc<dyn SyncChannel>,
    pub(super) tracker: PositionTracker,
    pub(super) persister: Arc<BookmarkPersister>,

    /// Identity attached to published sync events for echo suppression
    session_id: Uuid,

    /// Position of a remote seek currently being applied; consumed by
    /// seek_to so applied remote seeks are not re-published
    pub(super) seek_echo: Mutex<Option<f64>>,

    pub(super) pending: Mutex<Option<PendingLoad>>,

    adapter_rx: Mutex<Option<AdapterEventReceiver>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    pub(super) me: Weak<PlayerEngine>,
}

impl PlayerEngine {
    /// Build an engine over the given adapter, catalog, and sync channel
    ///
    /// `adapter_rx` is the receiving end of the channel the adapter pushes
    /// its events into. Call `start()` to spawn the event loops.
    pub fn new(
        config: EngineConfig,
        adapter: Arc<dyn AudioAdapter>,
        adapter_rx: AdapterEventReceiver,
        catalog: Arc<dyn CatalogApi>,
        sync: Arc<dyn SyncChannel>,
    ) -> Arc<Self> {
        let initial_rate = config
            .prefs_path
            .as_deref()
            .map(|path| DevicePrefs::load(path).rate)
            .unwrap_or(1.0);

        let state = Arc::new(SharedState::new(config.event_capacity, initial_rate));
        let persister = Arc::new(BookmarkPersister::new(
            Arc::clone(&catalog),
            config.bookmark_throttle(),
        ));
        let tracker = PositionTracker::new(Arc::clone(&state), Arc::clone(&persister));

        Arc::new_cyclic(|me| Self {
            config,
            state,
            session: RwLock::new(None),
            generation: AtomicU64::new(0),
            adapter,
            catalog,
            sync,
            tracker,
            persister,
            session_id: Uuid::new_v4(),
            seek_echo: Mutex::new(None),
            pending: Mutex::new(None),
            adapter_rx: Mutex::new(Some(adapter_rx)),
            tasks: Mutex::new(Vec::new()),
            me: me.clone(),
        })
    }

    /// Spawn the adapter-event and sync-event loops
    ///
    /// Idempotent: a second call finds the adapter receiver already taken
    /// and only re-subscribes to the sync channel, so call it once.
    pub async fn start(&self) {
        let mut tasks = self.tasks.lock().await;

        if let Some(mut rx) = self.adapter_rx.lock().await.take() {
            let me = self.me.clone();
            tasks.push(tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    let Some(engine) = me.upgrade() else { break };
                    engine.handle_adapter_event(event).await;
                }
            }));
        }

        let mut sync_rx = self.sync.subscribe();
        let me = self.me.clone();
        tasks.push(tokio::spawn(async move {
            loop {
                match sync_rx.recv().await {
                    Ok(event) => {
                        let Some(engine) = me.upgrade() else { break };
                        engine.handle_sync_event(event).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Sync receiver lagged, dropped {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }));

        info!(session_id = %self.session_id, "Player engine started");
    }

    /// Identity attached to this session's sync events
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Subscribe to player events
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.state.subscribe_events()
    }

    async fn handle_adapter_event(&self, event: AdapterEvent) {
        match event {
            AdapterEvent::TimeUpdate {
                position,
                duration,
                playing,
            } => {
                let key = self.bookmark_key().await;
                let slept = self.tracker.on_sample(key, position, duration, playing).await;
                self.emit_progress(playing).await;
                if slept {
                    info!("Sleep timer elapsed, pausing");
                    self.state.broadcast_event(PlayerEvent::SleepTimerElapsed {
                        timestamp: chrono::Utc::now(),
                    });
                    self.pause().await;
                }
            }

            AdapterEvent::LoadedMetadata { duration } => {
                let pending = self.pending.lock().await.take();
                match pending {
                    Some(pending) => {
                        if pending.generation != self.generation.load(Ordering::SeqCst) {
                            debug!("Discarding stale load completion");
                            return;
                        }
                        let mut position = 0.0;
                        if let Some(seek) = pending.seek {
                            let target = seek.clamp(0.0, duration);
                            self.adapter.seek(target);
                            position = target;
                        }
                        self.state.set_position(position, duration).await;
                        self.set_state(PlayerState::Ready).await;
                        if pending.autoplay {
                            self.play_internal(false).await;
                        }
                    }
                    None => {
                        let (position, _) = self.state.get_position().await;
                        self.state.set_position(position, duration).await;
                    }
                }
            }

            AdapterEvent::Ended => {
                // Pin the bookmark to the end before moving on
                if let Some(key) = self.bookmark_key().await {
                    let (_, duration) = self.state.get_position().await;
                    self.persister.write_now(&key, duration).await;
                }
                self.set_state(PlayerState::Ended).await;
                if let Err(e) = self.next().await {
                    warn!("Failed to advance after chapter end: {}", e);
                }
            }

            AdapterEvent::Error { message } => {
                warn!("Adapter error: {}", message);
                let chapter_id = self.state.get_now_playing().await.map(|n| n.chapter_id);
                self.set_state(PlayerState::Idle).await;
                self.state.broadcast_event(PlayerEvent::DecodeFailed {
                    chapter_id,
                    message,
                    timestamp: chrono::Utc::now(),
                });
            }
        }
    }

    async fn handle_sync_event(&self, event: SyncEvent) {
        // Our own events come back on shared channels
        if event.origin == self.session_id {
            return;
        }
        debug!(kind = ?event.kind, origin = %event.origin, "Applying remote transport event");

        match event.kind {
            SyncKind::Play => {
                let state = self.state.get_playback_state().await;
                if matches!(state, PlayerState::Paused | PlayerState::Ready) {
                    let (position, _) = self.state.get_position().await;
                    if (position - event.position).abs() > self.config.drift_tolerance_secs {
                        self.apply_remote_seek(event.position).await;
                    }
                    self.play_internal(false).await;
                }
            }
            SyncKind::Pause => {
                self.pause_internal(false).await;
            }
            SyncKind::Seek => {
                self.apply_remote_seek(event.position).await;
            }
        }
    }

    async fn apply_remote_seek(&self, position: f64) {
        *self.seek_echo.lock().await = Some(position);
        self.seek_to(position).await;
    }

    /// Load one chapter of a track into the adapter
    ///
    /// `offset` is applied once metadata arrives; `autoplay` starts playback
    /// at the same point. The previous chapter's position is flushed first.
    pub(super) async fn load_track(
        &self,
        track: PlayerTrack,
        offset: Option<f64>,
        autoplay: bool,
    ) -> Result<()> {
        let chapter = track
            .chapters
            .get(track.index)
            .ok_or_else(|| Error::ChapterNotFound(format!("index {}", track.index)))?
            .clone();

        // A chapter without audio is rejected up front; whatever is
        // currently loaded keeps playing
        let Some(audio_url) = chapter.audio_url.clone() else {
            self.state.broadcast_event(PlayerEvent::MediaUnavailable {
                chapter_id: chapter.id,
                timestamp: chrono::Utc::now(),
            });
            return Err(Error::MediaUnavailable(chapter.label()));
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // Flush the outgoing chapter's position
        if let Some(key) = self.bookmark_key().await {
            let (position, _) = self.state.get_position().await;
            self.persister.write_now(&key, position).await;
        }

        *self.session.write().await = Some(PlaybackSession {
            book_id: track.book_id,
            book_title: track.book_title.clone(),
            cover_url: track.cover_url.clone(),
            chapters: track.chapters.clone(),
            active_index: track.index,
        });
        self.state
            .set_now_playing(Some(NowPlaying {
                book_id: track.book_id,
                book_title: track.book_title.clone(),
                cover_url: track.cover_url,
                chapter_id: chapter.id,
                chapter_index: track.index,
                chapter_title: chapter.label(),
            }))
            .await;
        self.state.set_position(offset.unwrap_or(0.0), 0.0).await;
        self.set_state(PlayerState::Loading).await;

        *self.pending.lock().await = Some(PendingLoad {
            generation,
            seek: offset,
            autoplay,
        });

        self.adapter.load(&audio_url);
        self.adapter.set_rate(self.state.get_rate().await);

        info!(
            book = %track.book_title,
            chapter = %chapter.label(),
            index = track.index,
            "Loading chapter"
        );
        self.state.broadcast_event(PlayerEvent::ChapterChanged {
            book_id: track.book_id,
            chapter_id: chapter.id,
            chapter_index: track.index,
            title: chapter.label(),
            timestamp: chrono::Utc::now(),
        });

        Ok(())
    }

    /// Apply a late-arriving resume offset, if the chapter is still current
    pub(super) async fn apply_resume_offset(&self, generation: u64, offset: f64) {
        if generation != self.generation.load(Ordering::SeqCst) {
            debug!("Discarding resume offset for a superseded chapter");
            return;
        }

        let mut pending = self.pending.lock().await;
        if let Some(p) = pending.as_mut() {
            if p.generation == generation {
                p.seek = Some(offset);
                return;
            }
        }
        drop(pending);

        // Metadata already arrived; seek directly
        let (_, duration) = self.state.get_position().await;
        let target = if duration > 0.0 {
            offset.clamp(0.0, duration)
        } else {
            offset.max(0.0)
        };
        self.adapter.seek(target);
        self.state.set_position(target, duration).await;
    }

    /// Bookmark identity for the active chapter, if it is persistable
    pub(super) async fn bookmark_key(&self) -> Option<BookmarkKey> {
        let session = self.session.read().await;
        let session = session.as_ref()?;
        let chapter = session.active_chapter()?;
        if !chapter.has_audio() {
            return None;
        }
        Some(BookmarkKey {
            book_id: session.book_id,
            chapter_id: chapter.id,
            voice: chapter
                .voice
                .clone()
                .unwrap_or_else(|| self.config.voice.clone()),
            style: chapter
                .style
                .clone()
                .unwrap_or_else(|| self.config.style.clone()),
        })
    }

    pub(super) async fn set_state(&self, new_state: PlayerState) {
        let old_state = self.state.get_playback_state().await;
        if old_state == new_state {
            return;
        }
        self.state.set_playback_state(new_state).await;
        self.state.broadcast_event(PlayerEvent::StateChanged {
            old_state,
            new_state,
            timestamp: chrono::Utc::now(),
        });
    }

    pub(super) async fn emit_progress(&self, playing: bool) {
        let Some(now) = self.state.get_now_playing().await else {
            return;
        };
        let (position, duration) = self.state.get_position().await;
        self.state.broadcast_event(PlayerEvent::Progress {
            book_id: now.book_id,
            chapter_id: now.chapter_id,
            position_seconds: position,
            duration_seconds: duration,
            playing,
            timestamp: chrono::Utc::now(),
        });
    }

    pub(super) fn publish_sync(&self, kind: SyncKind, position: f64) {
        self.sync.publish(SyncEvent {
            kind,
            origin: self.session_id,
            position,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Point-in-time view for host surfaces
    pub async fn snapshot(&self) -> PlayerSnapshot {
        let state = self.state.get_playback_state().await;
        let (position, duration) = self.state.get_position().await;
        let rate = self.state.get_rate().await;
        let now = self.state.get_now_playing().await;
        let session = self.session.read().await;

        let has_audio = session
            .as_ref()
            .and_then(|s| s.active_chapter())
            .map(|c| c.has_audio())
            .unwrap_or(false);

        let sleep_remaining_secs = self.state.get_sleep_target().await.map(|target| {
            target
                .saturating_duration_since(tokio::time::Instant::now())
                .as_secs()
        });

        PlayerSnapshot {
            state,
            has_audio,
            playing: state == PlayerState::Playing,
            position,
            duration,
            rate,
            now_title: now.as_ref().map(|n| n.book_title.clone()),
            now_subtitle: now
                .as_ref()
                .map(|n| format!("{}. {}", n.chapter_index + 1, n.chapter_title)),
            chapter_index: now.as_ref().map(|n| n.chapter_index),
            chapters: session
                .as_ref()
                .map(|s| s.chapters.clone())
                .unwrap_or_default(),
            cover_url: now.and_then(|n| n.cover_url),
            sleep_remaining_secs,
        }
    }

    /// Flush the final bookmark, release the adapter, and stop event loops
    pub async fn shutdown(&self) {
        if let Some(key) = self.bookmark_key().await {
            let (position, _) = self.state.get_position().await;
            self.persister.write_now(&key, position).await;
        }
        self.adapter.release();
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
        info!("Player engine shut down");
    }
}
