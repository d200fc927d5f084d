// src/main.rs  —  morse-trainer  entry point
use anyhow::{Context, Result};
use clap::Parser;
use morse_trainer::app::TrainerApp;
use morse_trainer::audio;
use morse_trainer::config::{self, AppConfig, Cli};
use morse_trainer::playback::{OnComplete, Outcome, PlaybackEngine, StartOutcome};
use morse_trainer::tui::Tui;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // ── --print-config  ───────────────────────────────────────────────────────
    if cli.print_config {
        print!("{}", config::DEFAULT_CONFIG_TOML);
        return Ok(());
    }

    // ── --write-config  ───────────────────────────────────────────────────────
    if cli.write_config {
        let path = AppConfig::write_default_config(&cli)?;
        println!("Config written to: {}", path.display());
        println!("Edit it to set your speed, tone, language, etc.");
        return Ok(());
    }

    // ── Load config ───────────────────────────────────────────────────────────
    let cfg    = AppConfig::load(&cli)?;
    let course = cfg.load_course()?;

    // ── --list-lessons  ───────────────────────────────────────────────────────
    if cli.list_lessons {
        for lesson in course.lessons() {
            let chars: String = lesson.new_chars.iter().collect();
            println!("{:>3}  {:<24} {}", lesson.lesson_id, lesson.name, chars);
            for (id, desc) in course.exercises_for(lesson.lesson_id) {
                println!("       {id}: {desc}");
            }
        }
        return Ok(());
    }

    // ── Playback engine ───────────────────────────────────────────────────────
    let table = cfg.load_table()?.into_shared();
    let sink  = audio::open_sink(cfg.silent).context("Opening audio output")?;
    let engine = PlaybackEngine::new(sink, table, cfg.playback_settings())
        .context("Starting playback engine")?;
    let engine = Arc::new(engine);
    log::info!(
        "[main] {} WPM (farnsworth {}), {} Hz, {:?}",
        cfg.wpm, cfg.farnsworth_wpm, cfg.tone_hz, cfg.waveform
    );

    // ── --play TEXT  ──────────────────────────────────────────────────────────
    if let Some(text) = &cli.play {
        let (tx, rx) = mpsc::channel();
        let notify: OnComplete = Box::new(move |report| { let _ = tx.send(report); });
        match engine.start(text, Some(notify))? {
            StartOutcome::Started => {}
            StartOutcome::AlreadyPlaying => anyhow::bail!("playback already running"),
        }
        let report = rx.recv().context("Playback ended without a report")?;
        return match report.outcome {
            Outcome::Completed | Outcome::Cancelled => Ok(()),
            Outcome::Failed(e) => Err(e).context("Playing text"),
        };
    }

    // ── Trainer + TUI ─────────────────────────────────────────────────────────
    let mut app = TrainerApp::new(Arc::clone(&engine), course, &cfg);
    let mut tui = Tui::new(&cfg.language)?;
    let result  = run(&mut app, &mut tui);
    tui.cleanup();
    engine.stop();
    result?;

    println!("\n73! Keep practising.\n");
    Ok(())
}

// ── Main loop ─────────────────────────────────────────────────────────────────
fn run(app: &mut TrainerApp, tui: &mut Tui) -> Result<()> {
    let tick = Duration::from_millis(10);
    while !app.should_quit() {
        // ALL events are read here, never in any other thread.
        #[cfg(feature = "tui")]
        {
            use crossterm::event::{self, Event, KeyEventKind};
            while event::poll(Duration::from_millis(0))? {
                if let Event::Key(k) = event::read()? {
                    if k.kind == KeyEventKind::Release {
                        continue;
                    }
                    if let Some(input) = map_key(k) {
                        app.handle(input);
                    }
                }
            }
        }

        app.pump();
        tui.draw(&app.view())?;
        thread::sleep(tick);
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn map_key(k: crossterm::event::KeyEvent) -> Option<morse_trainer::app::Input> {
    use crossterm::event::{KeyCode, KeyModifiers};
    use morse_trainer::app::Input;
    // Escape or Ctrl+C always quit
    if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Input::Quit);
    }
    Some(match k.code {
        KeyCode::Esc       => Input::Quit,
        KeyCode::F(9)      => Input::Stop,
        KeyCode::F(2)      => Input::WpmDown,
        KeyCode::F(3)      => Input::WpmUp,
        KeyCode::F(4)      => Input::ToneDown,
        KeyCode::F(5)      => Input::ToneUp,
        KeyCode::F(6)      => Input::VolumeDown,
        KeyCode::F(7)      => Input::VolumeUp,
        KeyCode::F(8)      => Input::ToggleWaveform,
        KeyCode::PageUp    => Input::PrevLesson,
        KeyCode::PageDown  => Input::NextLesson,
        KeyCode::Tab       => Input::NextExercise,
        KeyCode::BackTab   => Input::PrevExercise,
        KeyCode::Enter     => Input::Enter,
        KeyCode::Backspace => Input::Backspace,
        KeyCode::Char(c)   => Input::Char(c),
        _ => return None,
    })
}
