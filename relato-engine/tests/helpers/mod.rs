//! Shared fixtures for engine integration tests
#![allow(dead_code)]

use relato_common::{Book, Bookmark, Chapter, ContinuePayload};
use relato_engine::audio::SimulatedAdapter;
use relato_engine::catalog::{CatalogApi, MemoryCatalog};
use relato_engine::sync::{LocalSyncBus, SyncChannel};
use relato_engine::{EngineConfig, PlayerEngine, PlayerTrack};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

pub const VOICE: &str = "onyx";
pub const STYLE: &str = "learning";

/// One chapter per flag; true means it has narration
pub fn chapters(audio: &[bool]) -> Vec<Chapter> {
    audio
        .iter()
        .enumerate()
        .map(|(i, &has_audio)| Chapter {
            id: Uuid::new_v4(),
            index_in_book: i as u32,
            title: Some(format!("Chapter {}", i + 1)),
            audio_url: has_audio.then(|| format!("/audio/{}/ch{}.mp3", Uuid::new_v4(), i)),
            voice: None,
            style: None,
        })
        .collect()
}

pub fn book() -> Book {
    Book {
        id: Uuid::new_v4(),
        title: "Test Book".to_string(),
        cover_url: Some("https://covers.example/test.jpg".to_string()),
    }
}

pub fn track(book: &Book, chapters: &[Chapter], index: usize) -> PlayerTrack {
    PlayerTrack {
        book_id: book.id,
        book_title: book.title.clone(),
        cover_url: book.cover_url.clone(),
        chapters: chapters.to_vec(),
        index,
    }
}

pub fn bookmark(book_id: Uuid, chapter_id: Uuid, position: u64) -> Bookmark {
    Bookmark {
        book_id,
        chapter_id,
        position_seconds: position,
        voice: VOICE.to_string(),
        style: STYLE.to_string(),
        updated_at: chrono::Utc::now(),
    }
}

pub fn continue_payload(book_id: Uuid, chapter: &Chapter, position: u64) -> ContinuePayload {
    ContinuePayload {
        bookmark: Some(bookmark(book_id, chapter.id, position)),
        chapter: Some(chapter.clone()),
    }
}

pub struct TestRig {
    pub engine: Arc<PlayerEngine>,
    pub adapter: Arc<SimulatedAdapter>,
    pub catalog: Arc<MemoryCatalog>,
    pub bus: Arc<LocalSyncBus>,
}

/// Engine over a shared catalog and sync bus (for multi-session tests)
pub async fn engine_on(
    catalog: Arc<MemoryCatalog>,
    bus: Arc<LocalSyncBus>,
    chapters: &[Chapter],
    chapter_duration: f64,
) -> (Arc<PlayerEngine>, Arc<SimulatedAdapter>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let adapter = SimulatedAdapter::new(tx);
    for chapter in chapters {
        if let Some(url) = &chapter.audio_url {
            adapter.register(url.clone(), chapter_duration);
        }
    }

    let engine = PlayerEngine::new(
        EngineConfig::new("test-user"),
        adapter.clone(),
        rx,
        catalog as Arc<dyn CatalogApi>,
        bus as Arc<dyn SyncChannel>,
    );
    engine.start().await;
    (engine, adapter)
}

/// Single-session rig with fresh catalog and bus
pub async fn rig(chapters: &[Chapter], chapter_duration: f64) -> TestRig {
    let catalog = Arc::new(MemoryCatalog::new());
    let bus = Arc::new(LocalSyncBus::default());
    let (engine, adapter) =
        engine_on(catalog.clone(), bus.clone(), chapters, chapter_duration).await;
    TestRig {
        engine,
        adapter,
        catalog,
        bus,
    }
}

/// Let spawned tasks run without meaningfully advancing the clock
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

/// Drain buffered player events, skipping over lag gaps
pub fn drain_events(
    rx: &mut tokio::sync::broadcast::Receiver<relato_common::PlayerEvent>,
) -> Vec<relato_common::PlayerEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(tokio::sync::broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    events
}
