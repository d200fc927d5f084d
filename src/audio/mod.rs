// src/audio/mod.rs  —  AudioSink trait, tone config, backends
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod error;
pub mod synth;

pub use error::AudioError;
pub use synth::synthesize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Waveform { Sine, Square }

impl Waveform {
    pub fn toggled(self) -> Self {
        match self {
            Waveform::Sine   => Waveform::Square,
            Waveform::Square => Waveform::Sine,
        }
    }
}

/// Tone parameters read at synthesis time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioConfig {
    pub tone_hz:     f32,
    /// 0.0 ..= 1.0
    pub volume:      f32,
    pub waveform:    Waveform,
    /// Click-suppression ramp length (sine only)
    pub envelope_ms: f32,
}

impl AudioConfig {
    pub fn with_volume(self, volume: f32) -> Self {
        Self { volume: volume.clamp(0.0, 1.0), ..self }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            tone_hz:     700.0,
            volume:      0.7,
            waveform:    Waveform::Sine,
            envelope_ms: 5.0,
        }
    }
}

/// Platform-agnostic audio output
pub trait AudioSink: Send {
    fn sample_rate(&self) -> u32;
    /// Play mono samples; returns once they have been handed to the device
    /// and played out (blocking the caller, never the UI).
    fn write(&mut self, samples: &[f32]) -> Result<(), AudioError>;
    /// Keep the line silent for `dur`
    fn pause(&mut self, dur: Duration) {
        std::thread::sleep(dur);
    }
}

// ── cpal backend ─────────────────────────────────────────────────────────────
#[cfg(feature = "audio-cpal")]
mod cpal_backend;
#[cfg(feature = "audio-cpal")]
pub use cpal_backend::CpalSink;

/// Null backend: no sound, keeps time. Used by tests and `--silent`.
pub struct NullSink {
    sample_rate: u32,
}

impl NullSink {
    pub fn new(sample_rate: u32) -> Self { Self { sample_rate: sample_rate.max(1) } }
}

impl Default for NullSink {
    fn default() -> Self { Self::new(44_100) }
}

impl AudioSink for NullSink {
    fn sample_rate(&self) -> u32 { self.sample_rate }
    fn write(&mut self, samples: &[f32]) -> Result<(), AudioError> {
        // Just sleep through the buffer so timing feels real
        let secs = samples.len() as f64 / f64::from(self.sample_rate);
        std::thread::sleep(Duration::from_secs_f64(secs));
        Ok(())
    }
}

/// Factory: the real device unless `silent` is set.
///
/// A device that cannot be opened is an error for the caller to report;
/// it is not quietly replaced by the null sink.
pub fn open_sink(silent: bool) -> Result<Box<dyn AudioSink>, AudioError> {
    if silent {
        log::info!("Audio disabled — using NullSink");
        return Ok(Box::new(NullSink::default()));
    }
    #[cfg(feature = "audio-cpal")]
    {
        Ok(Box::new(CpalSink::open()?))
    }
    #[cfg(not(feature = "audio-cpal"))]
    {
        log::warn!("Built without audio-cpal — using NullSink");
        Ok(Box::new(NullSink::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_is_clamped_when_set() {
        let c = AudioConfig::default();
        assert_eq!(c.with_volume(1.5).volume, 1.0);
        assert_eq!(c.with_volume(-0.2).volume, 0.0);
        assert_eq!(c.with_volume(0.25).volume, 0.25);
    }

    #[test]
    fn null_sink_accepts_writes() {
        let mut sink = NullSink::new(8_000);
        assert_eq!(sink.sample_rate(), 8_000);
        assert!(sink.write(&[0.0; 80]).is_ok());
    }
}
