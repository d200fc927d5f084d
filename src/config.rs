// src/config.rs  —  Runtime configuration (CLI + TOML)
use crate::audio::{AudioConfig, Waveform};
use crate::lesson::Course;
use crate::morse::CodeTable;
use crate::playback::PlaybackSettings;
use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The example config is embedded directly in the binary at compile time.
/// Users can write it out with:  morse-trainer --write-config
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config.toml.example");

// ── CLI ───────────────────────────────────────────────────────────────────────
#[derive(Parser, Debug, Default)]
#[command(
    name        = "morse-trainer",
    about       = "Morse code trainer — study, recognition and group reception",
    version,
)]
pub struct Cli {
    /// Config file path (default: ~/.config/morse-trainer/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Character speed in WPM (default: 20)
    #[arg(long)]
    pub wpm: Option<u32>,

    /// Farnsworth effective speed in WPM; 0 disables (default: 0)
    #[arg(long)]
    pub farnsworth_wpm: Option<u32>,

    /// Tone frequency Hz (default: 700)
    #[arg(long)]
    pub tone: Option<f32>,

    /// Volume 0.0 – 1.0 (default: 0.7)
    #[arg(long)]
    pub volume: Option<f32>,

    /// Waveform: sine | square
    #[arg(long)]
    pub waveform: Option<Waveform>,

    /// Character table JSON (default: built-in)
    #[arg(long)]
    pub characters: Option<PathBuf>,

    /// Lesson course JSON (default: built-in)
    #[arg(long)]
    pub lessons: Option<PathBuf>,

    /// Lesson to open at startup
    #[arg(long)]
    pub lesson: Option<u32>,

    /// Exercise to open at startup
    #[arg(long)]
    pub exercise: Option<u32>,

    /// Number of groups (recognition: groups × size rounds)
    #[arg(long)]
    pub groups: Option<usize>,

    /// Characters per group
    #[arg(long)]
    pub group_size: Option<usize>,

    /// UI language: en | de | ru
    #[arg(long)]
    pub lang: Option<String>,

    /// No audio device; playback only keeps time
    #[arg(long, action)]
    pub silent: bool,

    /// Play TEXT once and exit
    #[arg(long, value_name = "TEXT")]
    pub play: Option<String>,

    /// List lessons and their exercises and exit
    #[arg(long, action)]
    pub list_lessons: bool,

    /// Write the built-in default config.toml to the config path and exit.
    /// Use --config <PATH> to write to a custom location.
    #[arg(long, action)]
    pub write_config: bool,

    /// Print the built-in default config.toml to stdout and exit
    #[arg(long, action)]
    pub print_config: bool,
}

// ── TOML file structure ───────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    pub general: Option<GeneralCfg>,
    pub morse:   Option<MorseCfg>,
    pub lessons: Option<LessonsCfg>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralCfg {
    pub language: Option<String>,
    pub silent:   Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MorseCfg {
    pub wpm:            Option<u32>,
    pub farnsworth_wpm: Option<u32>,
    pub tone_hz:        Option<f32>,
    pub volume:         Option<f32>,
    pub waveform:       Option<Waveform>,
    /// Sine attack/decay ramp in ms
    pub envelope_ms:    Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonsCfg {
    pub characters_file: Option<PathBuf>,
    pub lessons_file:    Option<PathBuf>,
    pub lesson:          Option<u32>,
    pub exercise:        Option<u32>,
    pub groups:          Option<usize>,
    pub group_size:      Option<usize>,
}

// ── Resolved / merged config ──────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub language:        String,
    pub silent:          bool,
    pub wpm:             u32,
    pub farnsworth_wpm:  u32,
    pub tone_hz:         f32,
    pub volume:          f32,
    pub waveform:        Waveform,
    pub envelope_ms:     f32,
    /// `None` = built-in table
    pub characters_file: Option<PathBuf>,
    /// `None` = built-in course
    pub lessons_file:    Option<PathBuf>,
    pub lesson:          Option<u32>,
    pub exercise:        Option<u32>,
    pub groups:          usize,
    pub group_size:      usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let audio = AudioConfig::default();
        Self {
            language:        "en".into(),
            silent:          false,
            wpm:             20,
            farnsworth_wpm:  0,
            tone_hz:         audio.tone_hz,
            volume:          audio.volume,
            waveform:        audio.waveform,
            envelope_ms:     audio.envelope_ms,
            characters_file: None,
            lessons_file:    None,
            lesson:          None,
            exercise:        None,
            groups:          5,
            group_size:      5,
        }
    }
}

// ── Config loader ─────────────────────────────────────────────────────────────
impl AppConfig {
    /// Write the embedded default config to disk.
    /// Returns the path it was written to.
    pub fn write_default_config(cli: &Cli) -> Result<PathBuf> {
        let path = cli.config.clone().unwrap_or_else(default_config_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Creating config directory {:?}", parent))?;
        }
        std::fs::write(&path, DEFAULT_CONFIG_TOML)
            .with_context(|| format!("Writing config to {:?}", path))?;
        Ok(path)
    }

    pub fn load(cli: &Cli) -> Result<Self> {
        let mut cfg = Self::default();

        // 1. Load TOML file
        let path = cli.config.clone().unwrap_or_else(default_config_path);
        if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Reading config {:?}", path))?;
            let fc: FileConfig = toml::from_str(&raw)
                .with_context(|| format!("Parsing config {:?}", path))?;
            cfg.apply_file(&fc);
        } else {
            log::info!(
                "No config file at {} — run `morse-trainer --write-config` to create one",
                path.display()
            );
        }

        // 2. Apply CLI overrides
        cfg.apply_cli(cli);
        cfg.volume = cfg.volume.clamp(0.0, 1.0);
        cfg.wpm    = cfg.wpm.max(1);
        Ok(cfg)
    }

    fn apply_file(&mut self, fc: &FileConfig) {
        if let Some(g) = &fc.general {
            if let Some(v) = &g.language { self.language = v.clone(); }
            if let Some(v) = g.silent    { self.silent   = v; }
        }
        if let Some(m) = &fc.morse {
            if let Some(v) = m.wpm            { self.wpm            = v; }
            if let Some(v) = m.farnsworth_wpm { self.farnsworth_wpm = v; }
            if let Some(v) = m.tone_hz        { self.tone_hz        = v; }
            if let Some(v) = m.volume         { self.volume         = v; }
            if let Some(v) = m.waveform       { self.waveform       = v; }
            if let Some(v) = m.envelope_ms    { self.envelope_ms    = v; }
        }
        if let Some(l) = &fc.lessons {
            if let Some(v) = &l.characters_file { self.characters_file = Some(v.clone()); }
            if let Some(v) = &l.lessons_file    { self.lessons_file    = Some(v.clone()); }
            if let Some(v) = l.lesson           { self.lesson          = Some(v); }
            if let Some(v) = l.exercise         { self.exercise        = Some(v); }
            if let Some(v) = l.groups           { self.groups          = v; }
            if let Some(v) = l.group_size       { self.group_size      = v; }
        }
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(v) = cli.wpm            { self.wpm             = v; }
        if let Some(v) = cli.farnsworth_wpm { self.farnsworth_wpm  = v; }
        if let Some(v) = cli.tone           { self.tone_hz         = v; }
        if let Some(v) = cli.volume         { self.volume          = v; }
        if let Some(v) = cli.waveform       { self.waveform        = v; }
        if let Some(v) = &cli.characters    { self.characters_file = Some(v.clone()); }
        if let Some(v) = &cli.lessons       { self.lessons_file    = Some(v.clone()); }
        if let Some(v) = cli.lesson         { self.lesson          = Some(v); }
        if let Some(v) = cli.exercise       { self.exercise        = Some(v); }
        if let Some(v) = cli.groups         { self.groups          = v; }
        if let Some(v) = cli.group_size     { self.group_size      = v; }
        if let Some(v) = &cli.lang          { self.language        = v.clone(); }
        if cli.silent                       { self.silent          = true; }
    }

    pub fn playback_settings(&self) -> PlaybackSettings {
        PlaybackSettings {
            wpm:            self.wpm,
            farnsworth_wpm: self.farnsworth_wpm,
            audio: AudioConfig {
                tone_hz:     self.tone_hz,
                volume:      self.volume,
                waveform:    self.waveform,
                envelope_ms: self.envelope_ms,
            },
        }
    }

    pub fn load_table(&self) -> Result<CodeTable> {
        match &self.characters_file {
            Some(p) => CodeTable::load(p).with_context(|| format!("Loading characters {:?}", p)),
            None    => Ok(CodeTable::builtin()),
        }
    }

    pub fn load_course(&self) -> Result<Course> {
        match &self.lessons_file {
            Some(p) => Course::load(p).with_context(|| format!("Loading lessons {:?}", p)),
            None    => Ok(Course::builtin()),
        }
    }
}

fn default_config_path() -> PathBuf {
    dirs_next().join("morse-trainer").join("config.toml")
}

fn dirs_next() -> PathBuf {
    if let Ok(v) = std::env::var("XDG_CONFIG_HOME") { return PathBuf::from(v); }
    if let Ok(v) = std::env::var("APPDATA")          { return PathBuf::from(v); }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_default();
    PathBuf::from(home).join(".config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("morse-trainer").chain(args.iter().copied()))
    }

    #[test]
    fn embedded_example_parses() {
        let fc: FileConfig = toml::from_str(DEFAULT_CONFIG_TOML).expect("example config");
        let mut cfg = AppConfig::default();
        cfg.apply_file(&fc);
        assert_eq!(cfg.wpm, 20);
        assert_eq!(cfg.waveform, Waveform::Sine);
    }

    #[test]
    fn file_then_cli_precedence() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[morse]\nwpm = 12\ntone_hz = 600.0\nvolume = 3.0\nwaveform = \"square\"\n\
                     [lessons]\ngroups = 2").unwrap();
        let path = f.path().to_str().unwrap().to_string();

        let cfg = AppConfig::load(&cli(&["--config", path.as_str(), "--wpm", "25"])).unwrap();
        assert_eq!(cfg.wpm, 25);
        assert_eq!(cfg.tone_hz, 600.0);
        assert_eq!(cfg.volume, 1.0);
        assert_eq!(cfg.waveform, Waveform::Square);
        assert_eq!(cfg.groups, 2);
        assert_eq!(cfg.group_size, 5);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.toml");
        let cfg = AppConfig::load(&cli(&["--config", path.to_str().unwrap(), "--silent"])).unwrap();
        assert!(cfg.silent);
        assert_eq!(cfg.playback_settings().wpm, 20);
    }

    #[test]
    fn broken_file_is_an_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[morse\nwpm = ").unwrap();
        let path = f.path().to_str().unwrap().to_string();
        assert!(AppConfig::load(&cli(&["--config", path.as_str()])).is_err());
    }

    #[test]
    fn write_default_config_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let written = AppConfig::write_default_config(&cli(&["--config", path.to_str().unwrap()])).unwrap();
        assert_eq!(std::fs::read_to_string(written).unwrap(), DEFAULT_CONFIG_TOML);
    }

    #[test]
    fn custom_character_file_is_loaded() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, r#"{{"alphabet": {{"E": {{"code": ".", "mnemonic": "eh"}}}}}}"#).unwrap();
        let cfg = AppConfig { characters_file: Some(f.path().to_path_buf()), ..AppConfig::default() };
        let table = cfg.load_table().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get('e').unwrap().mnemonic, "eh");
    }
}
