//! Error types for relato-engine
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for the playback engine
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog/network request errors
    #[error("Network error: {0}")]
    Network(String),

    /// Chapter exists but has no playable narration
    #[error("Chapter has no playable audio: {0}")]
    MediaUnavailable(String),

    /// No chapter in the book has playable narration
    #[error("No playable chapter in book: {0}")]
    NoAudioAvailable(Uuid),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Missing or invalid chapter
    #[error("Chapter not found: {0}")]
    ChapterNotFound(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the engine Error
pub type Result<T> = std::result::Result<T, Error>;
