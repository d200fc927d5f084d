// src/tui/inner.rs  —  ratatui layout
use anyhow::Result;
use crossterm::{execute, terminal::{self, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};
use crate::app::AppState;
use crate::audio::Waveform;
use crate::i18n::I18n;
use std::io::stdout;

pub struct Tui {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    lang:     I18n,
}

impl Tui {
    pub fn new(lang: &str) -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen)?;
        let backend  = CrosstermBackend::new(out);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal, lang: I18n::new(lang) })
    }

    pub fn cleanup(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }

    pub fn draw(&mut self, s: &AppState) -> Result<()> {
        let lang = &self.lang;
        self.terminal.draw(|f| {
            let area = f.area();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),  // header
                    Constraint::Min(6),     // exercise panel
                    Constraint::Length(3),  // status
                    Constraint::Length(1),  // footer hints
                ])
                .split(area);

            // ── Header ────────────────────────────────────────────────────
            let wave = match s.waveform {
                Some(Waveform::Square) => "square",
                _                      => "sine",
            };
            let mut header = vec![
                Span::raw(format!(
                    " {}  |  {} {}  |  {} {}  |  {} WPM  {:.0} Hz  vol {:.1}  {} ",
                    lang.t("app.title"),
                    lang.t("label.lesson"), s.lesson,
                    lang.t("label.exercise"), s.exercise,
                    s.wpm, s.tone_hz, s.volume, wave,
                )),
            ];
            if s.playing {
                header.push(Span::styled(
                    format!(" {} ", lang.t("label.playing")),
                    Style::default().fg(Color::White).bg(Color::Red),
                ));
            }
            let header = Paragraph::new(Line::from(header))
                .block(Block::default().borders(Borders::BOTTOM))
                .style(Style::default().fg(Color::Black).bg(Color::Cyan)
                       .add_modifier(Modifier::BOLD));
            f.render_widget(header, chunks[0]);

            // ── Exercise panel ────────────────────────────────────────────
            let lines: Vec<Line> = s.panel.iter()
                .map(|l| Line::from(Span::styled(l.clone(), Style::default().fg(Color::Green))))
                .collect();
            let panel = Paragraph::new(lines)
                .block(Block::default()
                    .title(format!(" {} ", s.panel_title))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green)))
                .wrap(Wrap { trim: false });
            f.render_widget(panel, chunks[1]);

            // ── Status ────────────────────────────────────────────────────
            let status = Paragraph::new(Span::styled(
                s.status.clone(),
                Style::default().fg(Color::Magenta),
            ))
            .block(Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)));
            f.render_widget(status, chunks[2]);

            // ── Footer ────────────────────────────────────────────────────
            let footer = Paragraph::new(lang.t("footer.keys"))
                .style(Style::default().fg(Color::DarkGray).bg(Color::Black));
            f.render_widget(footer, chunks[3]);
        })?;
        Ok(())
    }
}
