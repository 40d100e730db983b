//! Command implementations for the CLI interface.
//!
//! Each handler works against an already-opened repository and returns a
//! `Result`; `main` turns errors into a message and a non-zero exit code.

use std::path::Path;

use clap::{builder::PossibleValuesParser, Subcommand};
use clap_complete::{generate, Shell};

use crate::config::Config;
use crate::db::KeyValueStore;
use crate::errors::{Result, TaskError};
use crate::fields::*;
use crate::form::{FieldChange, TaskForm};
use crate::repository::TaskRepository;
use crate::tui::run::run_tui;
use crate::view::{print_table, print_week, project, CalendarGrid, CategoryFilter, ViewOptions};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI.
    Ui {
        /// Start in the weekly calendar view.
        #[arg(long)]
        calendar: bool,
    },

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Category: work | personal | learning | health | errands | entertainment.
        #[arg(long, short, value_enum)]
        category: Option<Category>,
        /// Priority: low | medium | high.
        #[arg(long, short, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Calendar day (calendar variant). Defaults to today.
        #[arg(long, value_enum)]
        day: Option<Day>,
        /// Calendar time slot (calendar variant), e.g. "9:00 AM".
        #[arg(long, value_parser = PossibleValuesParser::new(TIME_SLOTS))]
        time: Option<String>,
    },

    /// List tasks, incomplete first.
    List {
        /// Only show one category.
        #[arg(long, short, value_enum)]
        category: Option<Category>,
        /// Hide completed tasks.
        #[arg(long)]
        hide_completed: bool,
        /// Sort key: newest | oldest | priority. Defaults to the configured key.
        #[arg(long, short, value_enum)]
        sort: Option<SortKey>,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
        /// Print the projected tasks as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the week grid.
    Week {
        /// Only show one category.
        #[arg(long, short, value_enum)]
        category: Option<Category>,
        /// Hide completed tasks.
        #[arg(long)]
        hide_completed: bool,
    },

    /// Toggle a task between complete and incomplete.
    Toggle {
        /// Task ID
        id: String,
    },

    /// Delete a task.
    Delete {
        /// Task ID
        id: String,
    },

    /// Show completion statistics.
    Stats,

    /// Show or change the dark-mode preference.
    Theme {
        /// Switch to dark mode.
        #[arg(long, conflicts_with = "light")]
        dark: bool,
        /// Switch to light mode.
        #[arg(long)]
        light: bool,
        /// Flip the current mode.
        #[arg(long, conflicts_with_all = ["dark", "light"])]
        toggle: bool,
    },

    /// Show or update config.json.
    Config {
        #[arg(long, value_enum)]
        set_variant: Option<Variant>,
        #[arg(long, value_enum)]
        set_sort: Option<SortKey>,
        #[arg(long)]
        set_show_completed: Option<bool>,
        #[arg(long)]
        set_welcome_banner: Option<bool>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Print and drain queued repository notifications.
fn print_notifications<S: KeyValueStore>(repo: &mut TaskRepository<S>) {
    for note in repo.take_notifications() {
        println!("{}", note);
    }
}

/// Launch the terminal user interface.
pub fn cmd_ui<S: KeyValueStore>(repo: &mut TaskRepository<S>, config: &Config, calendar: bool) -> Result<()> {
    run_tui(repo, config, calendar)
}

/// Add a new task through the form controller.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add<S: KeyValueStore>(
    repo: &mut TaskRepository<S>,
    title: String,
    category: Option<Category>,
    priority: Priority,
    desc: Option<String>,
    day: Option<Day>,
    time: Option<String>,
) -> Result<()> {
    let mut form = TaskForm::new();
    form.open();
    form.update(FieldChange::Title(title));
    form.update(FieldChange::Category(category));
    form.update(FieldChange::Priority(priority));
    if let Some(desc) = desc {
        form.update(FieldChange::Description(desc));
    }
    if let Some(day) = day {
        form.update(FieldChange::Day(day));
    }
    if let Some(time) = time {
        form.update(FieldChange::Time(time));
    }

    match form.submit(repo)? {
        Some(task) => {
            print_notifications(repo);
            println!("Task id: {}", task.id);
            Ok(())
        }
        None => Err(TaskError::Validation {
            errors: form.errors().clone(),
        }),
    }
}

/// List tasks through the projection pipeline.
pub fn cmd_list<S: KeyValueStore>(
    repo: &TaskRepository<S>,
    config: &Config,
    category: Option<Category>,
    hide_completed: bool,
    sort: Option<SortKey>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let options = ViewOptions {
        show_completed: config.show_completed && !hide_completed,
        category_filter: CategoryFilter::from(category),
        sort: sort.unwrap_or(config.default_sort),
    };
    let mut tasks = project(repo.tasks(), &options);
    if let Some(n) = limit {
        tasks.truncate(n);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }
    if tasks.is_empty() {
        match options.category_filter {
            CategoryFilter::All => {
                println!("Your task list is empty. Add your first task to get started!")
            }
            CategoryFilter::Only(c) => {
                println!("No {} tasks found. Try changing your filter.", c.name())
            }
        }
        return Ok(());
    }
    print_table(&tasks);
    Ok(())
}

/// Print the calendar week.
pub fn cmd_week<S: KeyValueStore>(
    repo: &TaskRepository<S>,
    config: &Config,
    category: Option<Category>,
    hide_completed: bool,
) {
    let options = ViewOptions {
        show_completed: config.show_completed && !hide_completed,
        category_filter: CategoryFilter::from(category),
        sort: config.default_sort,
    };
    let tasks = project(repo.tasks(), &options);
    let grid = CalendarGrid::build(&tasks);
    print_week(&grid);
}

pub fn cmd_toggle<S: KeyValueStore>(repo: &mut TaskRepository<S>, id: String) -> Result<()> {
    if repo.get(&id).is_none() {
        println!("No task with id {}", id);
        return Ok(());
    }
    repo.toggle_completion(&id)?;
    print_notifications(repo);
    if let Some(task) = repo.get(&id) {
        if !task.completed {
            println!("Reopened: {}", task.title);
        }
    }
    Ok(())
}

pub fn cmd_delete<S: KeyValueStore>(repo: &mut TaskRepository<S>, id: String) -> Result<()> {
    if repo.get(&id).is_none() {
        println!("No task with id {}", id);
        return Ok(());
    }
    repo.delete(&id)?;
    print_notifications(repo);
    Ok(())
}

pub fn cmd_stats<S: KeyValueStore>(repo: &TaskRepository<S>) {
    let stats = repo.stats();
    println!("Total Tasks: {}", stats.total);
    println!("Completed:   {}", stats.completed);
    println!("Progress:    {}%", stats.percentage);
}

pub fn cmd_theme<S: KeyValueStore>(
    repo: &mut TaskRepository<S>,
    dark: bool,
    light: bool,
    toggle: bool,
) -> Result<()> {
    let current = repo.store().load_dark_mode();
    let next = if dark {
        true
    } else if light {
        false
    } else if toggle {
        !current
    } else {
        current
    };
    if next != current {
        repo.store_mut().save_dark_mode(next)?;
    }
    println!("Theme: {}", if next { "dark" } else { "light" });
    Ok(())
}

pub fn cmd_config(
    data_dir: &Path,
    mut config: Config,
    variant: Option<Variant>,
    sort: Option<SortKey>,
    show_completed: Option<bool>,
    welcome_banner: Option<bool>,
) -> Result<()> {
    let changed = variant.is_some() || sort.is_some() || show_completed.is_some() || welcome_banner.is_some();
    if let Some(v) = variant {
        config.variant = v;
    }
    if let Some(s) = sort {
        config.default_sort = s;
    }
    if let Some(b) = show_completed {
        config.show_completed = b;
    }
    if let Some(b) = welcome_banner {
        config.welcome_banner = b;
    }
    if changed {
        config.save(data_dir)?;
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, TaskStore, TASKS_KEY};
    use crate::repository::FixedColorPicker;
    use crate::task::FormField;

    fn repo() -> TaskRepository<MemoryStore> {
        let mut kv = MemoryStore::new();
        kv.set(TASKS_KEY, "[]").unwrap();
        TaskRepository::open(
            TaskStore::new(kv),
            Variant::List,
            Box::new(FixedColorPicker(NoteColor::Yellow)),
        )
        .unwrap()
    }

    #[test]
    fn test_add_without_category_reports_field_error() {
        let mut repo = repo();
        let err = cmd_add(&mut repo, "Groceries".into(), None, Priority::Low, None, None, None)
            .unwrap_err();
        match err {
            TaskError::Validation { errors } => {
                assert_eq!(errors.get(FormField::Category), Some("Category is required"));
                assert_eq!(errors.get(FormField::Title), None);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(repo.tasks().is_empty());
    }

    #[test]
    fn test_add_then_toggle_and_delete() {
        let mut repo = repo();
        cmd_add(
            &mut repo,
            " Buy milk ".into(),
            Some(Category::Errands),
            Priority::Medium,
            Some("  2 liters ".into()),
            None,
            None,
        )
        .unwrap();
        let id = repo.tasks()[0].id.clone();
        assert_eq!(repo.tasks()[0].description, "2 liters");

        cmd_toggle(&mut repo, id.clone()).unwrap();
        assert!(repo.get(&id).unwrap().completed);
        cmd_toggle(&mut repo, "missing".into()).unwrap();
        cmd_delete(&mut repo, id).unwrap();
        assert!(repo.tasks().is_empty());
    }

    #[test]
    fn test_theme_flags() {
        let mut repo = repo();
        cmd_theme(&mut repo, false, false, true).unwrap();
        assert!(repo.store().load_dark_mode());
        cmd_theme(&mut repo, false, true, false).unwrap();
        assert!(!repo.store().load_dark_mode());
        cmd_theme(&mut repo, true, false, false).unwrap();
        assert!(repo.store().load_dark_mode());
    }
}
