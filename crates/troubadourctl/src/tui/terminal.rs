//! Terminal presenter - ratatui over crossterm in raw mode

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use troubadour_common::{OperatorIntent, Phase, WizardSession};

use super::input::map_key;
use super::render::draw;
use crate::runtime::Presenter;

pub struct TuiPresenter {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Serial being typed on the entry screen
    entry: String,
    phase: Phase,
    restored: bool,
}

impl TuiPresenter {
    /// Enter raw mode and the alternate screen
    pub fn start() -> Result<Self> {
        enable_raw_mode().map_err(|e| {
            anyhow::anyhow!("Failed to enable raw mode: {}. Run troubadourctl on a real terminal (TTY).", e)
        })?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|e| {
            let _ = disable_raw_mode();
            anyhow::anyhow!("Failed to initialize terminal: {}", e)
        })?;

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;

        Ok(Self {
            terminal,
            entry: String::new(),
            phase: Phase::Init,
            restored: false,
        })
    }

    /// Leave the alternate screen and raw mode. Safe to call twice.
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Presenter for TuiPresenter {
    fn render(&mut self, session: &WizardSession) -> Result<()> {
        // Fresh entry box every time the serial prompt is (re)entered
        if session.phase() == Phase::EnterSerial && self.phase != Phase::EnterSerial {
            self.entry.clear();
        }
        self.phase = session.phase();

        let entry = self.entry.as_str();
        self.terminal.draw(|f| draw(f, session, entry))?;
        Ok(())
    }

    fn poll_input(&mut self, timeout: Duration) -> Result<Option<OperatorIntent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                Ok(map_key(self.phase, key, &mut self.entry))
            }
            Event::Resize(_, _) => Ok(Some(OperatorIntent::Resize)),
            _ => Ok(None),
        }
    }
}

impl Drop for TuiPresenter {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}
