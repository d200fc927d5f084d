// src/playback/mod.rs  —  Cancellable background Morse playback
pub mod engine;
pub mod session;

pub use engine::{PlaybackEngine, PlaybackSettings};
pub use session::{CancelToken, OnComplete, Outcome, PlaybackReport, StartOutcome};
