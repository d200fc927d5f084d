// src/audio/cpal_backend.rs  —  cpal output stream fed from a sample queue
use super::{AudioError, AudioSink};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Grace period on top of a buffer's own length before a non-draining
/// stream is reported as stalled.
const STALL_GRACE: Duration = Duration::from_secs(2);
const DRAIN_POLL:  Duration = Duration::from_millis(2);

#[derive(Default)]
struct SharedState {
    queue:  VecDeque<f32>,
    failed: Option<String>,
}

pub struct CpalSink {
    state:       Arc<Mutex<SharedState>>,
    sample_rate: u32,
    _stream:     Stream,
}

// Stream is !Send on some platforms; wrap it
unsafe impl Send for CpalSink {}

fn lock(state: &Mutex<SharedState>) -> MutexGuard<'_, SharedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CpalSink {
    /// Open the default output device once; the stream runs until drop.
    pub fn open() -> Result<Self, AudioError> {
        let host   = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let config = device.default_output_config()
            .map_err(|e| AudioError::Stream(e.to_string()))?;
        let sample_rate = config.sample_rate().0;

        let state = Arc::new(Mutex::new(SharedState::default()));
        let st = Arc::clone(&state);
        let stream = match config.sample_format() {
            SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), st)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), st)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), st)?,
            other             => return Err(AudioError::UnsupportedFormat(format!("{other:?}"))),
        };
        stream.play().map_err(|e| AudioError::Stream(e.to_string()))?;

        log::info!(
            "Audio output: {} @ {sample_rate} Hz",
            device.name().unwrap_or_else(|_| "unknown device".into())
        );
        Ok(Self { state, sample_rate, _stream: stream })
    }
}

fn build_stream<S>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    state: Arc<Mutex<SharedState>>,
) -> Result<Stream, AudioError>
where S: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>
{
    let ch = usize::from(config.channels);
    let err_state = Arc::clone(&state);
    device.build_output_stream(
        config,
        move |data: &mut [S], _: &cpal::OutputCallbackInfo| {
            let mut s = lock(&state);
            for frame in data.chunks_mut(ch) {
                // Underrun plays silence
                let out = S::from_sample(s.queue.pop_front().unwrap_or(0.0));
                for smp in frame.iter_mut() { *smp = out; }
            }
        },
        move |e| {
            log::error!("Audio error: {e}");
            lock(&err_state).failed = Some(e.to_string());
        },
        None,
    )
    .map_err(|e| AudioError::Stream(e.to_string()))
}

impl AudioSink for CpalSink {
    fn sample_rate(&self) -> u32 { self.sample_rate }

    fn write(&mut self, samples: &[f32]) -> Result<(), AudioError> {
        {
            let mut s = lock(&self.state);
            if let Some(e) = &s.failed {
                return Err(AudioError::Write(e.clone()));
            }
            s.queue.extend(samples.iter().copied());
        }

        let own_len = Duration::from_secs_f64(samples.len() as f64 / f64::from(self.sample_rate));
        let deadline = Instant::now() + own_len + STALL_GRACE;
        loop {
            {
                let s = lock(&self.state);
                if let Some(e) = &s.failed {
                    return Err(AudioError::Write(e.clone()));
                }
                if s.queue.is_empty() {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                lock(&self.state).queue.clear();
                return Err(AudioError::Write("output stream stopped draining".into()));
            }
            std::thread::sleep(DRAIN_POLL);
        }
    }
}
