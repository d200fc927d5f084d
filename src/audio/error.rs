//! Audio device error types.

/// Failures of the single process-wide output stream.
///
/// `Clone` so a failed engine can keep handing the same error back to every
/// later caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    /// No default output device.
    #[error("No audio output device found")]
    NoDevice,

    /// Device offers a sample format the backend does not handle.
    #[error("Unsupported output sample format: {0}")]
    UnsupportedFormat(String),

    /// Opening, configuring or starting the stream failed.
    #[error("Failed to open audio output stream: {0}")]
    Stream(String),

    /// The stream failed while audio was being written.
    #[error("Audio write failed: {0}")]
    Write(String),

    /// A playback or completion thread could not be started.
    #[error("Cannot start playback thread: {0}")]
    Thread(String),
}
