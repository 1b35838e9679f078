//! Player engine
//!
//! The session controller that owns the audio adapter, the loaded book, and
//! the sync channel. Split by concern:
//!
//! - `core`: construction, event loops, chapter loading, state plumbing
//! - `transport`: play/pause/seek/rate/sleep-timer/recap commands
//! - `chapters`: chapter selection, resume, next/prev navigation

mod chapters;
mod core;
mod transport;

pub use self::core::PlayerEngine;
