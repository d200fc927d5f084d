// tests/playback.rs  —  Engine behaviour against a recording sink
use morse_trainer::audio::{AudioError, AudioSink, Waveform};
use morse_trainer::morse::CodeTable;
use morse_trainer::playback::{
    OnComplete, Outcome, PlaybackEngine, PlaybackReport, PlaybackSettings, StartOutcome,
};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const RATE: u32 = 1_000;
const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Tone(usize),
    Pause(Duration),
}

#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<Call>>>);

impl Log {
    fn calls(&self) -> Vec<Call> { self.0.lock().unwrap().clone() }
    fn tones(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Tone(_))).count()
    }
}

/// Records every write and pause; never touches a device.
struct RecordingSink {
    log:        Log,
    /// Real time spent per tone, so tests can act mid-sequence
    tone_delay: Duration,
    /// Fail the n-th write (0-based)
    fail_at:    Option<usize>,
    writes:     usize,
}

impl RecordingSink {
    fn new(log: &Log) -> Self {
        Self { log: log.clone(), tone_delay: Duration::ZERO, fail_at: None, writes: 0 }
    }
    fn slow(mut self, d: Duration) -> Self { self.tone_delay = d; self }
    fn failing_at(mut self, n: usize) -> Self { self.fail_at = Some(n); self }
}

impl AudioSink for RecordingSink {
    fn sample_rate(&self) -> u32 { RATE }
    fn write(&mut self, samples: &[f32]) -> Result<(), AudioError> {
        if self.fail_at == Some(self.writes) {
            return Err(AudioError::Write("unplugged".into()));
        }
        self.writes += 1;
        self.log.0.lock().unwrap().push(Call::Tone(samples.len()));
        thread::sleep(self.tone_delay);
        Ok(())
    }
    fn pause(&mut self, dur: Duration) {
        self.log.0.lock().unwrap().push(Call::Pause(dur));
    }
}

fn engine(sink: RecordingSink, wpm: u32) -> PlaybackEngine {
    let settings = PlaybackSettings { wpm, ..PlaybackSettings::default() };
    PlaybackEngine::new(Box::new(sink), CodeTable::itu().into_shared(), settings).expect("engine")
}

fn reporter() -> (OnComplete, Receiver<PlaybackReport>) {
    let (tx, rx) = mpsc::channel();
    (Box::new(move |r| { let _ = tx.send(r); }), rx)
}

#[test]
fn sos_writes_nine_tones_and_completes() {
    let log = Log::default();
    let eng = engine(RecordingSink::new(&log), 20);
    let (notify, rx) = reporter();

    assert_eq!(eng.start("SOS", Some(notify)), Ok(StartOutcome::Started));
    let report = rx.recv_timeout(WAIT).expect("completion");
    assert_eq!(report, PlaybackReport { text: "SOS".into(), outcome: Outcome::Completed });
    assert!(!eng.is_playing());

    // 20 WPM: dot 60 ms = 60 samples, dash 180
    let tones: Vec<usize> = log.calls().iter()
        .filter_map(|c| match c { Call::Tone(n) => Some(*n), _ => None })
        .collect();
    assert_eq!(tones, vec![60, 60, 60, 180, 180, 180, 60, 60, 60]);
    // Element gap after each tone, then the top-up to a character gap
    let pauses: Vec<Duration> = log.calls().iter()
        .filter_map(|c| match c { Call::Pause(d) => Some(*d), _ => None })
        .collect();
    assert_eq!(pauses.len(), 12);
    assert_eq!(pauses[..3], [Duration::from_millis(60); 3][..]);
    assert_eq!(pauses[3], Duration::from_millis(120));
}

#[test]
fn second_start_is_rejected_while_playing() {
    let log = Log::default();
    let eng = engine(RecordingSink::new(&log).slow(Duration::from_millis(20)), 20);
    let (first, rx1) = reporter();
    let (second, rx2) = reporter();

    assert_eq!(eng.start("EEEE", Some(first)), Ok(StartOutcome::Started));
    assert!(eng.is_playing());
    assert_eq!(eng.start("TTTT", Some(second)), Ok(StartOutcome::AlreadyPlaying));

    let report = rx1.recv_timeout(WAIT).expect("completion");
    assert_eq!(report.text, "EEEE");
    assert_eq!(report.outcome, Outcome::Completed);
    // Rejected requests never get a report.
    assert!(rx2.recv_timeout(Duration::from_millis(100)).is_err());
    assert!(rx1.recv_timeout(Duration::from_millis(100)).is_err());
    assert_eq!(log.tones(), 4);
}

#[test]
fn stop_cancels_mid_sequence() {
    let log = Log::default();
    let eng = engine(RecordingSink::new(&log).slow(Duration::from_millis(30)), 20);
    let (notify, rx) = reporter();

    let text = "EEEEEEEEEEEEEEEEEEEE";
    eng.start(text, Some(notify)).unwrap();
    while log.tones() == 0 {
        thread::sleep(Duration::from_millis(1));
    }
    eng.stop();
    eng.stop();

    let report = rx.recv_timeout(WAIT).expect("completion");
    assert_eq!(report.text, text);
    assert_eq!(report.outcome, Outcome::Cancelled);
    let played = log.tones();
    assert!(played < 20, "{played} tones after stop");

    thread::sleep(Duration::from_millis(100));
    assert_eq!(log.tones(), played);
    assert!(rx.try_recv().is_err());
    assert!(!eng.is_playing());
}

#[test]
fn stop_when_idle_is_harmless() {
    let log = Log::default();
    let eng = engine(RecordingSink::new(&log), 20);
    eng.stop();
    let (notify, rx) = reporter();
    eng.start("E", Some(notify)).unwrap();
    assert_eq!(rx.recv_timeout(WAIT).unwrap().outcome, Outcome::Completed);
    eng.stop();
    assert_eq!(log.tones(), 1);
}

#[test]
fn unknown_characters_play_nothing() {
    let log = Log::default();
    let eng = engine(RecordingSink::new(&log), 20);
    let (notify, rx) = reporter();

    assert_eq!(eng.start("#~", Some(notify)), Ok(StartOutcome::Started));
    assert_eq!(rx.recv_timeout(WAIT).unwrap().outcome, Outcome::Completed);
    assert_eq!(log.tones(), 0);
}

#[test]
fn configure_applies_to_following_steps() {
    let log = Log::default();
    let eng = engine(RecordingSink::new(&log).slow(Duration::from_millis(40)), 20);
    let (notify, rx) = reporter();

    eng.start("EEEEEE", Some(notify)).unwrap();
    while log.tones() == 0 {
        thread::sleep(Duration::from_millis(1));
    }
    eng.configure(10, 600.0, 0.5, Waveform::Square);
    assert_eq!(eng.settings().wpm, 10);
    rx.recv_timeout(WAIT).expect("completion");

    let tones: Vec<usize> = log.calls().iter()
        .filter_map(|c| match c { Call::Tone(n) => Some(*n), _ => None })
        .collect();
    assert_eq!(tones.first(), Some(&60));
    // 10 WPM dot = 120 ms
    assert_eq!(tones.last(), Some(&120));
}

#[test]
fn sink_failure_poisons_the_engine() {
    let log = Log::default();
    let eng = engine(RecordingSink::new(&log).failing_at(1), 20);
    let (notify, rx) = reporter();

    eng.start("EEE", Some(notify)).unwrap();
    let report = rx.recv_timeout(WAIT).unwrap();
    assert_eq!(report.outcome, Outcome::Failed(AudioError::Write("unplugged".into())));
    assert_eq!(log.tones(), 1);
    assert!(!eng.is_playing());

    assert_eq!(eng.fault(), Some(AudioError::Write("unplugged".into())));
    assert_eq!(eng.start("E", None), Err(AudioError::Write("unplugged".into())));
}

#[test]
fn completion_handler_may_start_the_next_text() {
    let log = Log::default();
    let eng = Arc::new(engine(RecordingSink::new(&log), 20));
    let (notify, rx) = reporter();

    let chained = Arc::clone(&eng);
    let first: OnComplete = Box::new(move |r| {
        assert_eq!(r.outcome, Outcome::Completed);
        let res = chained.start("T", Some(notify));
        assert_eq!(res, Ok(StartOutcome::Started));
    });
    eng.start("E", Some(first)).unwrap();

    let report = rx.recv_timeout(WAIT).expect("second completion");
    assert_eq!(report.text, "T");
    assert_eq!(log.tones(), 2);
}

#[test]
fn dropping_the_engine_stops_playback() {
    let log = Log::default();
    let eng = engine(RecordingSink::new(&log).slow(Duration::from_millis(20)), 20);
    let (notify, rx) = reporter();
    eng.start("EEEEEEEEEEEEEEEEEEEE", Some(notify)).unwrap();
    drop(eng);

    let report = rx.recv_timeout(WAIT).expect("completion on drop");
    assert_eq!(report.outcome, Outcome::Cancelled);
    assert!(log.tones() < 20);
}

#[test]
fn start_returns_before_a_long_text_is_expanded() {
    let log = Log::default();
    let eng = engine(RecordingSink::new(&log).slow(Duration::from_millis(20)), 20);
    let (notify, rx) = reporter();
    let text = "E".repeat(4_000_000);

    let began = Instant::now();
    assert_eq!(eng.start(&text, Some(notify)), Ok(StartOutcome::Started));
    let took = began.elapsed();
    eng.stop();

    assert!(took < Duration::from_millis(100), "start took {took:?}");
    let report = rx.recv_timeout(Duration::from_secs(30)).expect("completion");
    assert_eq!(report.outcome, Outcome::Cancelled);
    assert!(log.tones() <= 1);
}
