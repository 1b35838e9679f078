//! Relato engine demo binary
//!
//! Runs the playback engine against the in-memory catalog and the simulated
//! audio adapter: resumes a seeded three-chapter book from its bookmark,
//! plays it through, and logs every player event until the book ends or the
//! process is interrupted.

use anyhow::Result;
use clap::Parser;
use relato_common::{Book, Bookmark, Chapter, ContinuePayload, PlayerEvent};
use relato_engine::audio::SimulatedAdapter;
use relato_engine::catalog::{CatalogApi, MemoryCatalog};
use relato_engine::sync::{LocalSyncBus, SyncChannel};
use relato_engine::{EngineConfig, PlayerEngine};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Command-line arguments for the demo
#[derive(Parser, Debug)]
#[command(name = "relato-engine")]
#[command(about = "Relato playback engine demo")]
#[command(version)]
struct Args {
    /// User identity forwarded to the catalog
    #[arg(short, long, default_value = "demo-user", env = "RELATO_USER_ID")]
    user_id: String,

    /// Narration voice
    #[arg(long, default_value = "onyx")]
    voice: String,

    /// Narration style
    #[arg(long, default_value = "learning")]
    style: String,
}

fn demo_chapters() -> Vec<Chapter> {
    (0..3)
        .map(|i| Chapter {
            id: Uuid::new_v4(),
            index_in_book: i,
            title: Some(format!("Demo Chapter {}", i + 1)),
            audio_url: Some(format!("/audio/demo-{}.mp3", i + 1)),
            voice: None,
            style: None,
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relato_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("Starting Relato engine demo as user '{}'", args.user_id);

    let book = Book {
        id: Uuid::new_v4(),
        title: "The Demo Book".to_string(),
        cover_url: None,
    };
    let chapters = demo_chapters();

    // Seed a bookmark partway into chapter 2
    let catalog = Arc::new(MemoryCatalog::new());
    catalog.set_continue(
        book.id,
        ContinuePayload {
            bookmark: Some(Bookmark {
                book_id: book.id,
                chapter_id: chapters[1].id,
                position_seconds: 12,
                voice: args.voice.clone(),
                style: args.style.clone(),
                updated_at: chrono::Utc::now(),
            }),
            chapter: Some(chapters[1].clone()),
        },
    );

    let (adapter_tx, adapter_rx) = mpsc::unbounded_channel();
    let adapter = SimulatedAdapter::new(adapter_tx);
    for chapter in &chapters {
        if let Some(url) = &chapter.audio_url {
            adapter.register(url.clone(), 20.0);
        }
    }

    let sync = Arc::new(LocalSyncBus::default());

    let mut config = EngineConfig::new(args.user_id);
    config.voice = args.voice;
    config.style = args.style;

    let engine = PlayerEngine::new(
        config,
        adapter,
        adapter_rx,
        catalog as Arc<dyn CatalogApi>,
        sync as Arc<dyn SyncChannel>,
    );
    engine.start().await;

    let mut events = engine.subscribe_events();
    engine.resume_book(book, chapters).await?;

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        info!("Event: {}", event.event_type());
                        if matches!(event, PlayerEvent::EndOfBook { .. }) {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    engine.shutdown().await;
    info!("Demo complete");
    Ok(())
}
