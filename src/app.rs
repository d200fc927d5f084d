// src/app.rs  —  Trainer state machine between the front end and the engine
use crate::audio::Waveform;
use crate::config::AppConfig;
use crate::exercise::{format_groups, generate_exercise_text, score_copy, CopyScore, RecognitionDrill, Verdict};
use crate::i18n::I18n;
use crate::lesson::{Course, ExerciseKind};
use crate::playback::{OnComplete, Outcome, PlaybackEngine, PlaybackReport, StartOutcome};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

pub const WPM_RANGE:  (u32, u32) = (5, 60);
pub const TONE_RANGE: (f32, f32) = (300.0, 1200.0);
const TONE_STEP:   f32 = 50.0;
const VOLUME_STEP: f32 = 0.1;
/// A wrong answer is played back this many times
const REPLAYS:     u8  = 3;
const GROUPS_PER_LINE: usize = 5;

/// Front-end independent key actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Char(char),
    Enter,
    Backspace,
    Stop,
    NextLesson,
    PrevLesson,
    NextExercise,
    PrevExercise,
    WpmUp,
    WpmDown,
    ToneUp,
    ToneDown,
    VolumeUp,
    VolumeDown,
    ToggleWaveform,
    Quit,
}

/// Why a text was played; decides what happens when it ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Study,
    Prompt,
    Replay { remaining: u8 },
    Groups,
}

/// Posted by completion handlers; drained on the front end's own loop.
/// `generation` is the app's playback generation when the text was started;
/// events from an older generation are dropped.
#[derive(Debug)]
pub enum UiEvent {
    PlaybackDone { generation: u64, purpose: Purpose, report: PlaybackReport },
}

#[derive(Debug)]
enum Mode {
    Empty,
    Study { shown: Option<char> },
    Recognition { drill: RecognitionDrill, replaying: bool },
    Groups { sent: Option<String>, copy: String, result: Option<CopyScore>, listening: bool },
}

/// Snapshot handed to the TUI for drawing
#[derive(Debug, Default, Clone)]
pub struct AppState {
    pub lesson:      String,
    pub exercise:    String,
    pub wpm:         u32,
    pub tone_hz:     f32,
    pub volume:      f32,
    pub waveform:    Option<Waveform>,
    pub playing:     bool,
    pub panel_title: String,
    pub panel:       Vec<String>,
    pub status:      String,
    pub quit:        bool,
}

pub struct TrainerApp {
    engine:     Arc<PlaybackEngine>,
    course:     Course,
    lang:       I18n,
    events_tx:  Sender<UiEvent>,
    events_rx:  Receiver<UiEvent>,
    rng:        SmallRng,
    lesson_idx: usize,
    exercise_idx: usize,
    groups:     usize,
    group_size: usize,
    kind:       ExerciseKind,
    pool:       Vec<char>,
    mode:       Mode,
    pending:    Option<(String, Purpose)>,
    generation: u64,
    status:     String,
    quit:       bool,
}

impl TrainerApp {
    pub fn new(engine: Arc<PlaybackEngine>, course: Course, cfg: &AppConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        let lesson_idx = cfg.lesson
            .and_then(|id| course.lessons().iter().position(|l| l.lesson_id == id))
            .unwrap_or(0);
        let mut app = Self {
            engine,
            course,
            lang: I18n::new(&cfg.language),
            events_tx,
            events_rx,
            rng: SmallRng::from_entropy(),
            lesson_idx,
            exercise_idx: 0,
            groups: cfg.groups.max(1),
            group_size: cfg.group_size.max(1),
            kind: ExerciseKind::Unknown,
            pool: Vec::new(),
            mode: Mode::Empty,
            pending: None,
            generation: 0,
            status: String::new(),
            quit: false,
        };
        if let Some(id) = cfg.exercise {
            let ids = app.exercise_ids();
            app.exercise_idx = ids.iter().position(|&e| e == id).unwrap_or(0);
        }
        app.select_exercise();
        app
    }

    /// Reseed for reproducible drills
    pub fn with_rng(mut self, rng: SmallRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn should_quit(&self) -> bool { self.quit }
    pub fn kind(&self) -> ExerciseKind { self.kind }
    pub fn pool(&self) -> &[char] { &self.pool }
    pub fn status(&self) -> &str { &self.status }

    /// Text sent in the current group exercise, once revealed
    pub fn sent_groups(&self) -> Option<&str> {
        match &self.mode {
            Mode::Groups { sent, listening: false, .. } => sent.as_deref(),
            _ => None,
        }
    }

    pub fn copy_score(&self) -> Option<CopyScore> {
        match &self.mode {
            Mode::Groups { result, .. } => *result,
            _ => None,
        }
    }

    pub fn drill(&self) -> Option<&RecognitionDrill> {
        match &self.mode {
            Mode::Recognition { drill, .. } => Some(drill),
            _ => None,
        }
    }

    // ── selection ─────────────────────────────────────────────────────────────
    fn lesson_id(&self) -> Option<u32> {
        self.course.lessons().get(self.lesson_idx).map(|l| l.lesson_id)
    }

    fn exercise_ids(&self) -> Vec<u32> {
        self.lesson_id()
            .map(|id| self.course.exercises_for(id).into_iter().map(|(e, _)| e).collect())
            .unwrap_or_default()
    }

    /// Stop playback and disown every completion still in flight.
    fn reset_playback(&mut self) {
        self.engine.stop();
        self.pending = None;
        self.generation += 1;
    }

    fn select_exercise(&mut self) {
        self.reset_playback();
        let Some(lesson_id) = self.lesson_id() else {
            self.kind = ExerciseKind::Unknown;
            self.pool.clear();
            self.mode = Mode::Empty;
            self.status = self.lang.t("status.no_lessons").to_string();
            return;
        };
        let ids = self.exercise_ids();
        self.exercise_idx = self.exercise_idx.min(ids.len().saturating_sub(1));
        self.kind = ids.get(self.exercise_idx)
            .and_then(|&id| self.course.exercise(id))
            .map_or(ExerciseKind::Unknown, |e| e.kind);
        self.pool = self.course.character_pool(lesson_id, self.kind);
        log::info!("[app] lesson {lesson_id}, exercise {:?}, pool {:?}", self.kind, self.pool);

        self.mode = match self.kind {
            ExerciseKind::Study => Mode::Study { shown: None },
            k if k.is_recognition() => Mode::Recognition {
                drill: RecognitionDrill::new(self.pool.clone()),
                replaying: false,
            },
            ExerciseKind::GroupReception => Mode::Groups {
                sent: None, copy: String::new(), result: None, listening: false,
            },
            _ => Mode::Empty,
        };
        self.status = if self.pool.is_empty() {
            self.lang.t("status.empty_pool").to_string()
        } else {
            self.lang.t("status.ready").to_string()
        };
    }

    fn step_lesson(&mut self, forward: bool) {
        let n = self.course.lessons().len();
        if n == 0 { return; }
        self.lesson_idx = if forward { (self.lesson_idx + 1) % n } else { (self.lesson_idx + n - 1) % n };
        self.exercise_idx = 0;
        self.select_exercise();
    }

    fn step_exercise(&mut self, forward: bool) {
        let n = self.exercise_ids().len();
        if n == 0 { return; }
        self.exercise_idx = if forward { (self.exercise_idx + 1) % n } else { (self.exercise_idx + n - 1) % n };
        self.select_exercise();
    }

    // ── playback ──────────────────────────────────────────────────────────────
    fn play(&mut self, text: String, purpose: Purpose) {
        let tx = self.events_tx.clone();
        let generation = self.generation;
        let notify: OnComplete = Box::new(move |report| {
            let _ = tx.send(UiEvent::PlaybackDone { generation, purpose, report });
        });
        match self.engine.start(&text, Some(notify)) {
            Ok(StartOutcome::Started) => {}
            Ok(StartOutcome::AlreadyPlaying) => {
                // Latest request wins: cut the current text short, run this next.
                self.engine.stop();
                self.pending = Some((text, purpose));
            }
            Err(e) => self.status = format!("{}: {e}", self.lang.t("status.audio_error")),
        }
    }

    /// Drain completion events; call once per front-end tick.
    pub fn pump(&mut self) {
        while let Ok(ev) = self.events_rx.try_recv() {
            match ev {
                UiEvent::PlaybackDone { generation, purpose, report } => {
                    // Device failures are reported whatever the generation.
                    if generation == self.generation || matches!(report.outcome, Outcome::Failed(_)) {
                        self.on_playback_done(purpose, report);
                    } else {
                        log::debug!("[app] stale {purpose:?} for {:?} dropped", report.text);
                    }
                }
            }
        }
        if !self.engine.is_playing() {
            if let Some((text, purpose)) = self.pending.take() {
                self.play(text, purpose);
            }
        }
    }

    fn on_playback_done(&mut self, purpose: Purpose, report: PlaybackReport) {
        if let Outcome::Failed(e) = &report.outcome {
            self.status = format!("{}: {e}", self.lang.t("status.audio_error"));
            return;
        }
        let cancelled = report.outcome == Outcome::Cancelled;
        match purpose {
            Purpose::Replay { remaining } => {
                let Mode::Recognition { replaying, .. } = &mut self.mode else { return };
                if cancelled {
                    *replaying = false;
                } else if remaining > 1 {
                    self.play(report.text, Purpose::Replay { remaining: remaining - 1 });
                } else {
                    *replaying = false;
                    self.next_round();
                }
            }
            Purpose::Groups => self.finish_groups(),
            Purpose::Study | Purpose::Prompt => {}
        }
    }

    /// Reveal the sent groups and score the copy, once per transmission.
    fn finish_groups(&mut self) {
        let Mode::Groups { sent: Some(sent), copy, result, listening } = &mut self.mode else { return };
        if !*listening {
            return;
        }
        *listening = false;
        let score = score_copy(sent.as_str(), copy.as_str());
        log::info!("[app] group copy scored {}/{}", score.correct, score.total);
        *result = Some(score);
    }

    fn next_round(&mut self) {
        let Mode::Recognition { drill, .. } = &mut self.mode else { return };
        match drill.next_round(&mut self.rng) {
            Some(c) => {
                self.status = format!("{} {}", self.lang.t("rec.listen"), drill.rounds_left());
                self.play(c.to_string(), Purpose::Prompt);
            }
            None if self.pool.is_empty() => {
                self.status = self.lang.t("status.empty_pool").to_string();
            }
            None => {
                self.status = format!(
                    "{} {} {} / {}",
                    self.lang.t("rec.done"), self.lang.t("rec.score"), drill.correct, drill.wrong
                );
            }
        }
    }

    // ── input ─────────────────────────────────────────────────────────────────
    pub fn handle(&mut self, input: Input) {
        match input {
            Input::Quit => {
                self.reset_playback();
                self.quit = true;
            }
            Input::Stop => {
                self.reset_playback();
                if let Mode::Recognition { replaying, .. } = &mut self.mode {
                    *replaying = false;
                }
                self.finish_groups();
                self.status = self.lang.t("status.stopped").to_string();
            }
            Input::NextLesson     => self.step_lesson(true),
            Input::PrevLesson     => self.step_lesson(false),
            Input::NextExercise   => self.step_exercise(true),
            Input::PrevExercise   => self.step_exercise(false),
            Input::WpmUp          => self.adjust(|s| s.wpm = (s.wpm + 1).min(WPM_RANGE.1)),
            Input::WpmDown        => self.adjust(|s| s.wpm = s.wpm.saturating_sub(1).max(WPM_RANGE.0)),
            Input::ToneUp         => self.adjust(|s| s.tone = (s.tone + TONE_STEP).min(TONE_RANGE.1)),
            Input::ToneDown       => self.adjust(|s| s.tone = (s.tone - TONE_STEP).max(TONE_RANGE.0)),
            Input::VolumeUp       => self.adjust(|s| s.volume += VOLUME_STEP),
            Input::VolumeDown     => self.adjust(|s| s.volume -= VOLUME_STEP),
            Input::ToggleWaveform => self.adjust(|s| s.waveform = s.waveform.toggled()),
            Input::Enter          => self.on_enter(),
            Input::Backspace      => {
                if let Mode::Groups { copy, result: None, .. } = &mut self.mode {
                    copy.pop();
                }
            }
            Input::Char(c) => self.on_char(c),
        }
    }

    fn adjust(&mut self, f: impl FnOnce(&mut Knobs)) {
        let s = self.engine.settings();
        let mut k = Knobs {
            wpm:      s.wpm,
            tone:     s.audio.tone_hz,
            volume:   s.audio.volume,
            waveform: s.audio.waveform,
        };
        f(&mut k);
        // Round away float drift from repeated volume steps
        let volume = (k.volume * 10.0).round() / 10.0;
        self.engine.configure(k.wpm, k.tone, volume, k.waveform);
    }

    fn on_enter(&mut self) {
        if self.pool.is_empty() {
            self.status = self.lang.t("status.empty_pool").to_string();
            return;
        }
        let rounds = u32::try_from(self.groups.saturating_mul(self.group_size)).unwrap_or(u32::MAX);
        if matches!(self.mode, Mode::Recognition { .. } | Mode::Groups { .. }) {
            self.reset_playback();
        }
        match &mut self.mode {
            Mode::Recognition { drill, replaying } => {
                *replaying = false;
                drill.begin(rounds);
                self.next_round();
            }
            Mode::Groups { sent, copy, result, listening } => {
                let text = generate_exercise_text(&self.pool, self.groups, self.group_size, &mut self.rng);
                *sent = Some(text.clone());
                copy.clear();
                *result = None;
                *listening = true;
                self.status = self.lang.t("groups.receiving").to_string();
                self.play(text, Purpose::Groups);
            }
            Mode::Study { .. } | Mode::Empty => {
                self.status = self.lang.t("study.hint").to_string();
            }
        }
    }

    fn on_char(&mut self, c: char) {
        let upper = c.to_ascii_uppercase();
        match &mut self.mode {
            Mode::Study { shown } => {
                if self.pool.contains(&upper) {
                    *shown = Some(upper);
                    self.play(upper.to_string(), Purpose::Study);
                }
            }
            Mode::Recognition { drill, replaying } => {
                if *replaying {
                    return;
                }
                match drill.answer(upper) {
                    Verdict::Correct { .. } => {
                        self.status = self.lang.t("rec.correct").to_string();
                        self.next_round();
                    }
                    Verdict::Finished => {
                        self.next_round();
                    }
                    Verdict::Wrong { expected } => {
                        *replaying = true;
                        self.status = format!("{} {expected}", self.lang.t("rec.wrong"));
                        self.play(expected.to_string(), Purpose::Replay { remaining: REPLAYS });
                    }
                    Verdict::Inactive => {
                        self.status = format!("{} {upper}", self.lang.t("rec.inactive"));
                    }
                    Verdict::NoRound => {
                        self.status = self.lang.t("rec.no_round").to_string();
                    }
                }
            }
            Mode::Groups { sent: Some(_), copy, result: None, .. } => {
                if upper == ' ' || upper.is_ascii_graphic() {
                    copy.push(upper);
                }
            }
            _ => {}
        }
    }

    // ── view ──────────────────────────────────────────────────────────────────
    pub fn view(&self) -> AppState {
        let t = |k: &'static str| -> &'static str { self.lang.t(k) };
        let s = self.engine.settings();
        let lesson = self.course.lessons().get(self.lesson_idx);
        let exercise = lesson
            .and_then(|l| self.course.exercises_for(l.lesson_id).get(self.exercise_idx).copied())
            .map(|(id, desc)| format!("{id}: {desc}"))
            .unwrap_or_default();

        let pool: String = self.pool.iter().map(|c| format!("{c} ")).collect();
        let mut panel = vec![format!("{}: {}", t("label.pool"), pool.trim_end()), String::new()];
        let panel_title = match &self.mode {
            Mode::Empty => t("panel.empty"),
            Mode::Study { shown } => {
                panel.push(t("study.hint").to_string());
                if let Some((c, entry)) = shown.and_then(|c| self.engine.lookup(c).map(|e| (c, e))) {
                    panel.push(String::new());
                    panel.push(format!("  {c}"));
                    panel.push(format!("  {}: {}", t("study.code"), entry.code()));
                    if !entry.mnemonic.is_empty() {
                        panel.push(format!("  {}: {}", t("study.mnemonic"), entry.mnemonic));
                    }
                }
                t("panel.study")
            }
            Mode::Recognition { drill, .. } => {
                panel.push(t("rec.hint").to_string());
                panel.push(format!("{} {} / {}", t("rec.score"), drill.correct, drill.wrong));
                t("panel.recognition")
            }
            Mode::Groups { sent, copy, result, listening } => {
                panel.push(t("groups.hint").to_string());
                panel.push(String::new());
                panel.push(format!("{}: {copy}", t("groups.copy")));
                if let (Some(sent), false) = (sent, *listening) {
                    panel.push(String::new());
                    panel.push(format!("{}:", t("groups.sent")));
                    panel.extend(format_groups(sent, GROUPS_PER_LINE).lines().map(|l| format!("  {l}")));
                }
                if let Some(r) = result {
                    panel.push(format!(
                        "{} {}/{} ({:.0}%)", t("groups.score"), r.correct, r.total, r.accuracy()
                    ));
                }
                t("panel.groups")
            }
        };

        AppState {
            lesson: lesson.map(|l| format!("{}: {}", l.lesson_id, l.name)).unwrap_or_default(),
            exercise,
            wpm: s.wpm,
            tone_hz: s.audio.tone_hz,
            volume: s.audio.volume,
            waveform: Some(s.audio.waveform),
            playing: self.engine.is_playing(),
            panel_title: panel_title.to_string(),
            panel,
            status: self.status.clone(),
            quit: self.quit,
        }
    }

    pub fn lang(&self) -> &I18n { &self.lang }
}

struct Knobs {
    wpm:      u32,
    tone:     f32,
    volume:   f32,
    waveform: Waveform,
}
