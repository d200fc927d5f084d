// src/playback/engine.rs  —  Text → timed tones on a background worker
use super::session::{
    CancelToken, Completion, OnComplete, Outcome, PlaybackReport, PlaybackSession, StartOutcome,
};
use crate::audio::{synthesize, AudioConfig, AudioError, AudioSink, Waveform};
use crate::morse::{sequence, CodeEntry, CodeTable, Step, TimingProfile};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

type SharedSink = Arc<Mutex<Box<dyn AudioSink>>>;

/// Speed and tone, swapped as one unit under a single lock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSettings {
    pub wpm:            u32,
    /// 0 = off
    pub farnsworth_wpm: u32,
    pub audio:          AudioConfig,
}

impl PlaybackSettings {
    pub fn timing(&self) -> TimingProfile {
        TimingProfile::farnsworth(self.wpm, self.farnsworth_wpm)
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self { wpm: 20, farnsworth_wpm: 0, audio: AudioConfig::default() }
    }
}

fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything a worker needs, cloned out of the engine per session
#[derive(Clone)]
struct WorkerCtx {
    sink:     SharedSink,
    settings: Arc<RwLock<PlaybackSettings>>,
    playing:  Arc<AtomicBool>,
    fault:    Arc<Mutex<Option<AudioError>>>,
    done_tx:  Sender<Completion>,
}

impl WorkerCtx {
    fn snapshot(&self) -> PlaybackSettings {
        *self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Plays at most one text at a time on the shared output sink.
///
/// `start` only does bookkeeping and spawns the worker; the worker walks
/// the step list, checking its cancel token before every step, and finally
/// hands a [`PlaybackReport`] to the dispatcher thread which runs the
/// caller's handler.
pub struct PlaybackEngine {
    table:      Arc<CodeTable>,
    ctx:        WorkerCtx,
    session:    Mutex<Option<PlaybackSession>>,
    dispatcher: Option<JoinHandle<()>>,
}

impl PlaybackEngine {
    /// Fails only when the completion dispatcher thread cannot be spawned.
    pub fn new(
        sink: Box<dyn AudioSink>,
        table: Arc<CodeTable>,
        settings: PlaybackSettings,
    ) -> Result<Self, AudioError> {
        let (done_tx, done_rx) = mpsc::channel::<Completion>();
        let dispatcher = thread::Builder::new()
            .name("morse-completion".into())
            .spawn(move || {
                while let Ok(done) = done_rx.recv() {
                    log::debug!("[playback] {:?} → notifying", done.report.outcome);
                    if let Some(notify) = done.notify {
                        notify(done.report);
                    }
                }
            })
            .map_err(|e| AudioError::Thread(e.to_string()))?;

        let settings = PlaybackSettings {
            wpm:   settings.wpm.max(1),
            audio: settings.audio.with_volume(settings.audio.volume),
            ..settings
        };
        Ok(Self {
            table,
            ctx: WorkerCtx {
                sink:     Arc::new(Mutex::new(sink)),
                settings: Arc::new(RwLock::new(settings)),
                playing:  Arc::new(AtomicBool::new(false)),
                fault:    Arc::new(Mutex::new(None)),
                done_tx,
            },
            session: Mutex::new(None),
            dispatcher: Some(dispatcher),
        })
    }

    /// Update speed and tone. Takes effect from the next step played;
    /// audio already handed to the sink is not touched.
    pub fn configure(&self, wpm: u32, tone_hz: f32, volume: f32, waveform: Waveform) {
        let mut s = self.ctx.settings.write().unwrap_or_else(PoisonError::into_inner);
        s.wpm   = wpm.max(1);
        s.audio = AudioConfig { tone_hz, waveform, ..s.audio }.with_volume(volume);
        log::debug!("[playback] configured {} WPM, {tone_hz} Hz, vol {:.2}, {waveform:?}", s.wpm, s.audio.volume);
    }

    /// Farnsworth spacing; `0` turns it off
    pub fn set_farnsworth(&self, eff_wpm: u32) {
        self.ctx.settings.write().unwrap_or_else(PoisonError::into_inner).farnsworth_wpm = eff_wpm;
    }

    pub fn settings(&self) -> PlaybackSettings { self.ctx.snapshot() }

    pub fn is_playing(&self) -> bool { self.ctx.playing.load(Ordering::Acquire) }

    pub fn lookup(&self, ch: char) -> Option<&CodeEntry> { self.table.get(ch) }

    pub fn table(&self) -> &Arc<CodeTable> { &self.table }

    /// The device error that stopped this engine, if any
    pub fn fault(&self) -> Option<AudioError> { lock(&self.ctx.fault).clone() }

    /// Begin playing `text` in the background.
    ///
    /// Returns [`StartOutcome::AlreadyPlaying`] without side effects when a
    /// session is active. `on_complete` runs exactly once for every
    /// `Started` result.
    pub fn start(&self, text: &str, on_complete: Option<OnComplete>) -> Result<StartOutcome, AudioError> {
        if let Some(e) = self.fault() {
            return Err(e);
        }

        // Holding the slot across the swap keeps `stop` from cancelling a
        // finished session while the new one is being installed.
        let mut slot = lock(&self.session);
        if self.ctx.playing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("[playback] already playing — rejected {text:?}");
            return Ok(StartOutcome::AlreadyPlaying);
        }
        if let Some(old) = slot.take() {
            // Already past its playing flag; only the completion send is left.
            let _ = old.worker.join();
        }

        let cancel = CancelToken::new();
        let ctx    = self.ctx.clone();
        let table  = Arc::clone(&self.table);
        let report_text = text.to_string();
        let token  = cancel.clone();
        log::info!("[playback] start {text:?}");

        let spawned = thread::Builder::new()
            .name("morse-playback".into())
            .spawn(move || {
                let steps = sequence(&report_text, &table);
                log::debug!("[playback] {} steps", steps.len());
                let outcome = run_steps(&steps, &ctx, &token);
                if let Outcome::Failed(e) = &outcome {
                    log::error!("[playback] audio device failed: {e}");
                    *lock(&ctx.fault) = Some(e.clone());
                }
                log::info!("[playback] {outcome:?}: {report_text:?}");
                // Clear first so the handler may start the next session.
                ctx.playing.store(false, Ordering::Release);
                let _ = ctx.done_tx.send(Completion {
                    report: PlaybackReport { text: report_text, outcome },
                    notify: on_complete,
                });
            });
        let worker = match spawned {
            Ok(w) => w,
            Err(e) => {
                self.ctx.playing.store(false, Ordering::Release);
                return Err(AudioError::Thread(e.to_string()));
            }
        };

        *slot = Some(PlaybackSession { text: text.to_string(), cancel, worker });
        Ok(StartOutcome::Started)
    }

    /// Ask the active session to halt before its next step. Idempotent.
    pub fn stop(&self) {
        if let Some(s) = lock(&self.session).as_ref() {
            if !s.cancel.is_cancelled() && self.is_playing() {
                log::info!("[playback] stop requested for {:?}", s.text);
            }
            s.cancel.cancel();
        }
    }
}

fn run_steps(steps: &[Step], ctx: &WorkerCtx, cancel: &CancelToken) -> Outcome {
    let mut sink = lock(&ctx.sink);
    for step in steps {
        if cancel.is_cancelled() {
            return Outcome::Cancelled;
        }
        let s   = ctx.snapshot();
        let dur = step.duration(&s.timing());
        match step {
            Step::Tone(_) => {
                let buf = synthesize(dur, &s.audio, sink.sample_rate());
                if let Err(e) = sink.write(&buf) {
                    return Outcome::Failed(e);
                }
            }
            Step::Gap(_) if !dur.is_zero() => sink.pause(dur),
            Step::Gap(_) => {}
        }
    }
    Outcome::Completed
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        if let Some(s) = lock(&self.session).take() {
            s.cancel.cancel();
            let _ = s.worker.join();
        }
        // Closing the channel ends the dispatcher loop.
        let (closed_tx, _) = mpsc::channel();
        drop(std::mem::replace(&mut self.ctx.done_tx, closed_tx));
        if let Some(d) = self.dispatcher.take() {
            // Dropped from inside a completion handler: cannot join ourselves.
            if d.thread().id() != thread::current().id() {
                let _ = d.join();
            }
        }
    }
}
