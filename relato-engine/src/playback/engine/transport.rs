//! Transport commands: play, pause, seek, rate, sleep timer, recap

use super::PlayerEngine;
use crate::error::{Error, Result};
use crate::prefs::DevicePrefs;
use crate::sync::SyncKind;
use relato_common::{PlayerEvent, PlayerState};
use std::time::Duration;
use tracing::{info, warn};

impl PlayerEngine {
    /// Start or resume playback (user-invoked; announced on the sync
    /// channel)
    pub async fn play(&self) {
        self.play_internal(true).await;
    }

    /// Pause playback (user-invoked; announced on the sync channel)
    pub async fn pause(&self) {
        self.pause_internal(true).await;
    }

    pub(super) async fn play_internal(&self, announce: bool) {
        match self.state.get_playback_state().await {
            PlayerState::Loading => {
                // Metadata not in yet; flip the pending load to autoplay
                if let Some(pending) = self.pending.lock().await.as_mut() {
                    pending.autoplay = true;
                }
                return;
            }
            PlayerState::Ready | PlayerState::Paused | PlayerState::Ended => {}
            PlayerState::Playing | PlayerState::Idle => return,
        }

        self.adapter.play();
        self.set_state(PlayerState::Playing).await;
        // Immediate sample so UIs never wait a tick for feedback
        self.emit_progress(true).await;

        if announce {
            let (position, _) = self.state.get_position().await;
            self.publish_sync(SyncKind::Play, position);
        }
    }

    pub(super) async fn pause_internal(&self, announce: bool) {
        self.adapter.pause();

        // Pause always pins a bookmark, throttle or not
        if let Some(key) = self.bookmark_key().await {
            let (position, _) = self.state.get_position().await;
            self.persister.write_now(&key, position).await;
        }

        if self.state.get_playback_state().await == PlayerState::Playing {
            self.set_state(PlayerState::Paused).await;
            self.emit_progress(false).await;

            if announce {
                let (position, _) = self.state.get_position().await;
                self.publish_sync(SyncKind::Pause, position);
            }
        }
    }

    /// Toggle between playing and paused; no-op without playable audio
    pub async fn toggle(&self) {
        let has_audio = {
            let session = self.session.read().await;
            session
                .as_ref()
                .and_then(|s| s.active_chapter())
                .map(|c| c.has_audio())
                .unwrap_or(false)
        };
        if !has_audio {
            return;
        }

        match self.state.get_playback_state().await {
            PlayerState::Playing => self.pause().await,
            _ => self.play().await,
        }
    }

    /// Seek to an absolute position in the active chapter
    ///
    /// Clamped to [0, duration]. Published on the sync channel unless this
    /// seek is the application of a remote one.
    pub async fn seek_to(&self, seconds: f64) {
        if self.session.read().await.is_none() {
            // An echo token armed for this seek must not outlive it, or it
            // would swallow a later genuine local seek near the same spot
            self.seek_echo.lock().await.take();
            return;
        }

        let (_, duration) = self.state.get_position().await;
        let target = if duration > 0.0 {
            seconds.clamp(0.0, duration)
        } else {
            seconds.max(0.0)
        };

        self.adapter.seek(target);
        self.state.set_position(target, duration).await;

        // A matching echo token means this seek came off the sync channel
        let mut echo = self.seek_echo.lock().await;
        if let Some(origin) = echo.take() {
            if (origin - seconds).abs() <= 0.25 || (origin - target).abs() <= 0.25 {
                return;
            }
            *echo = Some(origin);
        }
        drop(echo);

        self.publish_sync(SyncKind::Seek, target);
    }

    /// Seek relative to the current position (negative skips back)
    pub async fn seek_by(&self, delta_seconds: f64) {
        let (position, _) = self.state.get_position().await;
        self.seek_to(position + delta_seconds).await;
    }

    /// Change the playback rate, clamped to the configured range
    pub async fn set_rate(&self, rate: f64) {
        let new_rate = rate.clamp(self.config.min_rate, self.config.max_rate);
        let old_rate = self.state.get_rate().await;
        if (new_rate - old_rate).abs() < f64::EPSILON {
            return;
        }

        self.state.set_rate(new_rate).await;
        self.adapter.set_rate(new_rate);
        self.state.broadcast_event(PlayerEvent::RateChanged {
            old_rate,
            new_rate,
            timestamp: chrono::Utc::now(),
        });

        if let Some(path) = self.config.prefs_path.as_deref() {
            let prefs = DevicePrefs {
                rate: new_rate,
                voice: Some(self.config.voice.clone()),
            };
            if let Err(e) = prefs.save(path) {
                warn!("Failed to persist device prefs: {}", e);
            }
        }
    }

    /// Arm the sleep timer, or clear it with 0 minutes
    pub async fn set_sleep_timer(&self, minutes: u64) {
        if minutes == 0 {
            self.state.set_sleep_target(None).await;
            info!("Sleep timer cleared");
        } else {
            let target = tokio::time::Instant::now() + Duration::from_secs(minutes * 60);
            self.state.set_sleep_target(Some(target)).await;
            info!(minutes, "Sleep timer armed");
        }
    }

    /// Generate a recap of the active chapter up to the current position
    pub async fn recap(&self) -> Result<String> {
        let now = self
            .state
            .get_now_playing()
            .await
            .ok_or_else(|| Error::InvalidState("nothing is playing".to_string()))?;
        let (position, _) = self.state.get_position().await;

        self.catalog
            .recap_chapter(
                now.book_id,
                now.chapter_id,
                position.max(0.0).floor() as u64,
                &self.config.style,
            )
            .await
    }
}
