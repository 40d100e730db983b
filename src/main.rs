//! # ColorTask - colorful task manager for the terminal
//!
//! Create, categorize, prioritize and complete tasks from a scriptable CLI or an
//! interactive terminal UI, optionally laid out on a weekly calendar as colored
//! sticky notes.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive UI (default when no command is given)
//! ct
//!
//! # Start on the week board
//! ct ui --calendar
//!
//! # Add a task
//! ct add "Buy milk" --category errands --priority low
//!
//! # List incomplete work tasks, highest priority first
//! ct list --category work --hide-completed --sort priority
//! ```
//!
//! ## Variants
//!
//! - **list**: plain task list.
//! - **calendar**: new tasks also get a day, a time slot and a sticky-note color.
//!
//! Pick one with `--variant` or `ct config --set-variant calendar`.
//!
//! Data is stored in `~/.colortask/` (`colorTasks.json`, `darkMode.json`,
//! `config.json`). Pass `--data-dir` to use another directory.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{debug, info, LevelFilter};

pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod errors;
pub mod fields;
pub mod form;
pub mod repository;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod calendar;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{default_data_dir, Config};
use db::{FileStore, TaskStore};
use errors::Result;
use repository::{RandomColorPicker, TaskRepository};

/// Log file used while the terminal UI owns the screen.
const LOG_FILE: &str = "colortask.log";

/// Set up `env_logger`. `RUST_LOG` still wins over the default level. When
/// `log_file` is given, output goes there instead of stderr.
pub fn initialize_logger(verbose: bool, log_file: Option<&Path>) {
    let default_level = if verbose { "debug" } else { "warn" };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    builder.format_timestamp_secs().format_module_path(true);

    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(_) => {
                // Nowhere safe to write while the UI is up.
                builder.filter_level(LevelFilter::Off);
            }
        }
    }
    builder.init();
    debug!("Logger initialized");
}

fn run(cli: Cli) -> Result<()> {
    let data_dir: PathBuf = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    fs::create_dir_all(&data_dir)?;

    let command = cli.command.unwrap_or(Commands::Ui { calendar: false });
    let log_file = matches!(command, Commands::Ui { .. }).then(|| data_dir.join(LOG_FILE));
    initialize_logger(cli.verbose, log_file.as_deref());
    info!("Using data directory {}", data_dir.display());

    let mut config = Config::load(&data_dir)?;
    if let Some(variant) = cli.variant {
        config.variant = variant;
    }

    // Commands that do not touch the task list.
    let command = match command {
        Commands::Completions { shell } => {
            cmd_completions(shell);
            return Ok(());
        }
        Commands::Config {
            set_variant,
            set_sort,
            set_show_completed,
            set_welcome_banner,
        } => {
            return cmd_config(
                &data_dir,
                Config::load(&data_dir)?,
                set_variant,
                set_sort,
                set_show_completed,
                set_welcome_banner,
            );
        }
        other => other,
    };

    let store = TaskStore::new(FileStore::open(&data_dir)?);
    let mut repo = TaskRepository::open(store, config.variant, Box::new(RandomColorPicker::new()))?;

    match command {
        Commands::Ui { calendar } => cmd_ui(&mut repo, &config, calendar),
        Commands::Add {
            title,
            category,
            priority,
            desc,
            day,
            time,
        } => cmd_add(&mut repo, title, category, priority, desc, day, time),
        Commands::List {
            category,
            hide_completed,
            sort,
            limit,
            json,
        } => cmd_list(&repo, &config, category, hide_completed, sort, limit, json),
        Commands::Week {
            category,
            hide_completed,
        } => {
            cmd_week(&repo, &config, category, hide_completed);
            Ok(())
        }
        Commands::Toggle { id } => cmd_toggle(&mut repo, id),
        Commands::Delete { id } => cmd_delete(&mut repo, id),
        Commands::Stats => {
            cmd_stats(&repo);
            Ok(())
        }
        Commands::Theme { dark, light, toggle } => cmd_theme(&mut repo, dark, light, toggle),
        Commands::Completions { .. } | Commands::Config { .. } => unreachable!("handled above"),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
