//! Playback coordination
//!
//! - `engine`: the session controller driving the audio adapter
//! - `session`: the loaded book/chapter bundle
//! - `tracker`: position samples into shared state, persistence, sleep timer
//! - `persister`: throttled bookmark writes
//! - `resume`: resolving where to start a book

pub mod engine;
pub mod persister;
pub mod resume;
pub mod session;
pub mod tracker;

pub use engine::PlayerEngine;
pub use session::{PlaybackSession, PlayerTrack};
