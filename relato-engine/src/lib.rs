//! # Relato playback engine (relato-engine)
//!
//! Audiobook playback synchronization: resume resolution, throttled bookmark
//! persistence, a generation-guarded session controller over a pluggable
//! audio adapter, cross-session transport sync with echo suppression, sleep
//! timer, and a media-session bridge.
//!
//! Hosts construct a [`PlayerEngine`] over an [`audio::AudioAdapter`], a
//! [`catalog::CatalogApi`], and a [`sync::SyncChannel`], then drive it with
//! transport commands and consume [`relato_common::PlayerEvent`]s.

pub mod audio;
pub mod catalog;
pub mod config;
pub mod error;
pub mod media_session;
pub mod playback;
pub mod prefs;
pub mod state;
pub mod sync;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use playback::{PlayerEngine, PlayerTrack};
pub use state::PlayerSnapshot;
