mod charts;

pub use charts::render_chart;

use crate::chart::{ChartEmitter, ChartSpec};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Terminal,
};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::debug;

/// Full-screen chart viewer. Each emitted chart stays on screen until a key
/// is pressed; `q`, `Esc` or `Ctrl-C` skips the remaining charts.
pub struct TerminalEmitter {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    shown: usize,
    quit: bool,
    restored: bool,
}

impl TerminalEmitter {
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).ok();

        let backend = CrosstermBackend::new(stdout);
        let mut terminal =
            restore_on_err(Terminal::new(backend), leave_terminal).context("create terminal")?;
        terminal.clear().ok();
        Ok(Self {
            terminal,
            shown: 0,
            quit: false,
            restored: false,
        })
    }

    fn restore(&mut self) {
        if self.restored {
            return;
        }
        disable_raw_mode().ok();
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).ok();
        self.terminal.show_cursor().ok();
        self.restored = true;
    }

    /// Block until the user asks for the next chart. Returns false on quit.
    fn wait_for_key(&mut self, chart: &ChartSpec) -> Result<bool> {
        let shown = self.shown;
        loop {
            self.terminal
                .draw(|f| {
                    let rows = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
                        .split(f.area());
                    render_chart(f, rows[0], chart);
                    f.render_widget(footer(shown), rows[1]);
                })
                .context("draw chart")?;

            if !event::poll(Duration::from_millis(250)).unwrap_or(false) {
                continue;
            }
            if let Event::Key(k) = event::read().context("read terminal event")? {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                return Ok(match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q'))
                    | (_, KeyCode::Esc)
                    | (KeyModifiers::CONTROL, KeyCode::Char('c')) => false,
                    _ => true,
                });
            }
        }
    }
}

fn footer(shown: usize) -> Paragraph<'static> {
    Paragraph::new(Line::from(vec![
        Span::raw(format!("chart {shown}  ")),
        Span::styled("any key", Style::default().fg(Color::Magenta)),
        Span::raw(" next  "),
        Span::styled("q", Style::default().fg(Color::Magenta)),
        Span::raw(" / "),
        Span::styled("Esc", Style::default().fg(Color::Magenta)),
        Span::raw(" quit"),
    ]))
}

impl ChartEmitter for TerminalEmitter {
    fn emit(&mut self, chart: &ChartSpec) -> Result<()> {
        if self.quit {
            debug!(title = %chart.title, "viewer closed, skipping chart");
            return Ok(());
        }
        self.shown += 1;
        let res = self.wait_for_key(chart);
        match res {
            Ok(true) => Ok(()),
            Ok(false) => {
                self.quit = true;
                Ok(())
            }
            Err(e) => {
                self.restore();
                Err(e)
            }
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.restore();
        Ok(())
    }
}

impl Drop for TerminalEmitter {
    fn drop(&mut self) {
        self.restore();
    }
}

fn leave_terminal() {
    execute!(io::stdout(), LeaveAlternateScreen).ok();
    disable_raw_mode().ok();
}

/// Run `restore` when setup after entering raw mode fails.
fn restore_on_err<T>(result: io::Result<T>, restore: impl FnOnce()) -> io::Result<T> {
    if result.is_err() {
        restore();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn failed_setup_restores_terminal() {
        let restored = Cell::new(false);
        let result: io::Result<()> =
            restore_on_err(Err(io::Error::other("no tty")), || restored.set(true));
        assert!(result.is_err());
        assert!(restored.get());
    }

    #[test]
    fn successful_setup_keeps_terminal() {
        let restored = Cell::new(false);
        let result = restore_on_err(Ok(7), || restored.set(true));
        assert_eq!(result.unwrap(), 7);
        assert!(!restored.get());
    }
}
