//! Audio adapter capability interface
//!
//! The engine never touches an audio backend directly. It issues commands
//! through `AudioAdapter` and consumes `AdapterEvent`s pushed back over an
//! unbounded channel. Any backend that can honor this contract (platform
//! media player, streaming decoder, simulation) plugs in unchanged.

mod simulated;

pub use simulated::SimulatedAdapter;

use tokio::sync::mpsc;

/// Events pushed from the adapter to the engine
#[derive(Debug, Clone)]
pub enum AdapterEvent {
    /// Periodic position sample while a resource is loaded
    TimeUpdate {
        position: f64,
        duration: f64,
        playing: bool,
    },
    /// Resource metadata became available; duration is now known
    LoadedMetadata { duration: f64 },
    /// Playback reached the end of the resource
    Ended,
    /// Load or decode failure
    Error { message: String },
}

pub type AdapterEventSender = mpsc::UnboundedSender<AdapterEvent>;
pub type AdapterEventReceiver = mpsc::UnboundedReceiver<AdapterEvent>;

/// Commands the engine issues to an audio backend
///
/// All methods are fire-and-forget; outcomes arrive as `AdapterEvent`s.
pub trait AudioAdapter: Send + Sync {
    /// Begin loading the given audio resource, replacing any current one
    fn load(&self, reference: &str);

    /// Start or resume playback
    fn play(&self);

    /// Pause playback, keeping the position
    fn pause(&self);

    /// Jump to an absolute position in seconds
    fn seek(&self, seconds: f64);

    /// Change the playback rate
    fn set_rate(&self, rate: f64);

    /// Drop the current resource and stop emitting events for it
    fn release(&self);
}
