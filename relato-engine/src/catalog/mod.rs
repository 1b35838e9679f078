//! Catalog access
//!
//! The engine talks to the catalog through the `CatalogApi` trait: resume
//! lookups, bookmark writes, and recap generation. `HttpCatalog` is the real
//! client; `MemoryCatalog` is the in-process implementation used by tests
//! and the demo binary.

mod http;
mod memory;

pub use http::HttpCatalog;
pub use memory::MemoryCatalog;

use crate::error::Result;
use async_trait::async_trait;
use relato_common::ContinuePayload;
use uuid::Uuid;

/// Capability surface the engine needs from the catalog
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch the resume record for a book under a (voice, style) rendering
    async fn get_continue(
        &self,
        book_id: Uuid,
        voice: &str,
        style: &str,
    ) -> Result<ContinuePayload>;

    /// Persist the playback position for a chapter
    async fn save_bookmark(
        &self,
        book_id: Uuid,
        chapter_id: Uuid,
        position_seconds: u64,
        voice: &str,
        style: &str,
    ) -> Result<()>;

    /// Generate a recap of the chapter up to the given position
    async fn recap_chapter(
        &self,
        book_id: Uuid,
        chapter_id: Uuid,
        position_seconds: u64,
        style: &str,
    ) -> Result<String>;
}
