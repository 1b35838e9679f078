//! # Relato shared types (relato-common)
//!
//! Catalog data model and event definitions shared between the playback
//! engine and whatever hosts it (UI shells, media-session bridges, tests).

pub mod events;
pub mod model;

pub use events::{EventBus, PlayerEvent, PlayerState};
pub use model::{Book, Bookmark, Chapter, ContinuePayload};
