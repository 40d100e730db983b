//! TUI entry point and terminal setup.

use std::io;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{prelude::CrosstermBackend, Terminal};

use crate::config::Config;
use crate::db::KeyValueStore;
use crate::errors::{Result, TaskError};
use crate::repository::TaskRepository;
use crate::tui::app::App;

fn terminal_error(e: io::Error) -> TaskError {
    TaskError::Terminal { message: e.to_string() }
}

/// Initialise and run the terminal user interface until the user quits.
/// The terminal is restored even when the event loop fails.
pub fn run_tui<S: KeyValueStore>(repo: &mut TaskRepository<S>, config: &Config, calendar: bool) -> Result<()> {
    enable_raw_mode().map_err(terminal_error)?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(terminal_error)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(terminal_error)?;

    info!("UI started");
    let mut app = App::new(repo, config, calendar);
    let result = app.run(&mut terminal);

    disable_raw_mode().map_err(terminal_error)?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).map_err(terminal_error)?;
    terminal.show_cursor().map_err(terminal_error)?;
    info!("UI closed");

    result
}
