//! Simulated audio adapter
//!
//! Clock-driven `AudioAdapter` implementation. Registered resources have a
//! fixed duration; while playing, a tokio interval advances the position by
//! `tick * rate` and pushes TimeUpdate samples. Drives the demo binary and
//! every timing test (paused-clock compatible, since all waiting goes
//! through tokio::time).

use crate::audio::{AdapterEvent, AdapterEventSender, AudioAdapter};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tracing::debug;

const DEFAULT_TICK: Duration = Duration::from_millis(250);

struct Resource {
    url: String,
    duration: f64,
    position: f64,
    playing: bool,
}

struct Inner {
    current: Option<Resource>,
    rate: f64,
    library: HashMap<String, f64>,
}

/// Clock-driven adapter over a registry of (url, duration) resources
pub struct SimulatedAdapter {
    inner: Mutex<Inner>,
    events: AdapterEventSender,
    load_count: AtomicUsize,
}

impl SimulatedAdapter {
    pub fn new(events: AdapterEventSender) -> Arc<Self> {
        Self::with_tick(events, DEFAULT_TICK)
    }

    /// Adapter with a custom sample interval
    pub fn with_tick(events: AdapterEventSender, tick: Duration) -> Arc<Self> {
        let adapter = Arc::new(Self {
            inner: Mutex::new(Inner {
                current: None,
                rate: 1.0,
                library: HashMap::new(),
            }),
            events,
            load_count: AtomicUsize::new(0),
        });

        // The clock task holds a Weak so dropping the adapter stops it.
        let weak: Weak<SimulatedAdapter> = Arc::downgrade(&adapter);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Some(adapter) = weak.upgrade() else {
                    break;
                };
                adapter.advance(tick.as_secs_f64());
            }
        });

        adapter
    }

    /// Register a playable resource
    pub fn register(&self, url: impl Into<String>, duration_seconds: f64) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.library.insert(url.into(), duration_seconds);
        }
    }

    /// Advance the clock by one tick and emit samples
    fn advance(&self, tick_secs: f64) {
        let mut ended = false;
        let mut sample = None;

        if let Ok(mut inner) = self.inner.lock() {
            let rate = inner.rate;
            if let Some(resource) = inner.current.as_mut() {
                if resource.playing {
                    resource.position += tick_secs * rate;
                    if resource.position >= resource.duration {
                        resource.position = resource.duration;
                        resource.playing = false;
                        ended = true;
                    }
                    sample = Some(AdapterEvent::TimeUpdate {
                        position: resource.position,
                        duration: resource.duration,
                        playing: resource.playing,
                    });
                }
            }
        }

        if let Some(sample) = sample {
            let _ = self.events.send(sample);
        }
        if ended {
            let _ = self.events.send(AdapterEvent::Ended);
        }
    }

    // Test accessors

    /// Current position of the loaded resource
    pub fn position(&self) -> f64 {
        self.inner
            .lock()
            .ok()
            .and_then(|i| i.current.as_ref().map(|r| r.position))
            .unwrap_or(0.0)
    }

    /// Whether the loaded resource is advancing
    pub fn is_playing(&self) -> bool {
        self.inner
            .lock()
            .ok()
            .and_then(|i| i.current.as_ref().map(|r| r.playing))
            .unwrap_or(false)
    }

    /// URL of the loaded resource
    pub fn loaded(&self) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|i| i.current.as_ref().map(|r| r.url.clone()))
    }

    /// Number of load() calls so far
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }
}

impl AudioAdapter for SimulatedAdapter {
    fn load(&self, reference: &str) {
        self.load_count.fetch_add(1, Ordering::SeqCst);

        let duration = self
            .inner
            .lock()
            .ok()
            .and_then(|i| i.library.get(reference).copied());

        match duration {
            Some(duration) => {
                if let Ok(mut inner) = self.inner.lock() {
                    inner.current = Some(Resource {
                        url: reference.to_string(),
                        duration,
                        position: 0.0,
                        playing: false,
                    });
                }
                debug!(url = %reference, duration, "Simulated load");
                let _ = self.events.send(AdapterEvent::LoadedMetadata { duration });
            }
            None => {
                if let Ok(mut inner) = self.inner.lock() {
                    inner.current = None;
                }
                let _ = self.events.send(AdapterEvent::Error {
                    message: format!("unknown resource: {}", reference),
                });
            }
        }
    }

    fn play(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(resource) = inner.current.as_mut() {
                resource.playing = true;
            }
        }
    }

    fn pause(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(resource) = inner.current.as_mut() {
                resource.playing = false;
            }
        }
    }

    fn seek(&self, seconds: f64) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(resource) = inner.current.as_mut() {
                resource.position = seconds.clamp(0.0, resource.duration);
            }
        }
    }

    fn set_rate(&self, rate: f64) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.rate = rate;
        }
    }

    fn release(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AdapterEventReceiver;
    use tokio::sync::mpsc;

    fn adapter() -> (Arc<SimulatedAdapter>, AdapterEventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SimulatedAdapter::new(tx), rx)
    }

    #[tokio::test]
    async fn load_known_resource_emits_metadata() {
        let (adapter, mut rx) = adapter();
        adapter.register("/audio/ch1.mp3", 120.0);
        adapter.load("/audio/ch1.mp3");

        match rx.recv().await {
            Some(AdapterEvent::LoadedMetadata { duration }) => assert_eq!(duration, 120.0),
            other => panic!("expected LoadedMetadata, got {:?}", other),
        }
        assert_eq!(adapter.loaded().as_deref(), Some("/audio/ch1.mp3"));
        assert_eq!(adapter.load_count(), 1);
    }

    #[tokio::test]
    async fn load_unknown_resource_emits_error() {
        let (adapter, mut rx) = adapter();
        adapter.load("/audio/missing.mp3");

        match rx.recv().await {
            Some(AdapterEvent::Error { message }) => {
                assert!(message.contains("missing.mp3"));
            }
            other => panic!("expected Error, got {:?}", other),
        }
        assert!(adapter.loaded().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn playback_advances_with_virtual_time() {
        let (adapter, _rx) = adapter();
        adapter.register("/audio/ch1.mp3", 60.0);
        adapter.load("/audio/ch1.mp3");
        adapter.play();

        tokio::time::sleep(Duration::from_secs(10)).await;
        let position = adapter.position();
        assert!(
            (position - 10.0).abs() < 0.5,
            "expected ~10s, got {}",
            position
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rate_scales_advancement() {
        let (adapter, _rx) = adapter();
        adapter.register("/audio/ch1.mp3", 600.0);
        adapter.load("/audio/ch1.mp3");
        adapter.set_rate(2.0);
        adapter.play();

        tokio::time::sleep(Duration::from_secs(10)).await;
        let position = adapter.position();
        assert!(
            (position - 20.0).abs() < 1.0,
            "expected ~20s at 2x, got {}",
            position
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reaching_duration_emits_ended() {
        let (adapter, mut rx) = adapter();
        adapter.register("/audio/short.mp3", 2.0);
        adapter.load("/audio/short.mp3");
        // Drain LoadedMetadata
        let _ = rx.recv().await;
        adapter.play();

        tokio::time::sleep(Duration::from_secs(3)).await;

        let mut ended = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, AdapterEvent::Ended) {
                ended = true;
            }
        }
        assert!(ended);
        assert!(!adapter.is_playing());
        assert_eq!(adapter.position(), 2.0);
    }
}
