// src/playback/session.rs  —  One playback request: text, cancel token, worker
use crate::audio::AudioError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Cooperative cancellation flag handed to exactly one worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self { Self::default() }
    pub fn cancel(&self) { self.0.store(true, Ordering::Release); }
    pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Acquire) }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Cancelled,
    /// The sink failed; the engine refuses further playback.
    Failed(AudioError),
}

/// Delivered once per accepted `start`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackReport {
    pub text:    String,
    pub outcome: Outcome,
}

/// Completion handler. Runs on the engine's dispatcher thread, never on the
/// playback worker; UIs should forward it to their own event loop.
pub type OnComplete = Box<dyn FnOnce(PlaybackReport) + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// Another session is still active; nothing was queued.
    AlreadyPlaying,
}

pub(crate) struct PlaybackSession {
    pub text:   String,
    pub cancel: CancelToken,
    pub worker: JoinHandle<()>,
}

/// Message from worker to dispatcher. Owning the `FnOnce` makes the
/// handler single-shot by construction.
pub(crate) struct Completion {
    pub report: PlaybackReport,
    pub notify: Option<OnComplete>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_clones_share_state() {
        let t = CancelToken::new();
        let seen_by_worker = t.clone();
        assert!(!seen_by_worker.is_cancelled());
        t.cancel();
        t.cancel();
        assert!(seen_by_worker.is_cancelled());
    }
}
