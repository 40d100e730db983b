//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which manages the TUI state,
//! handles user input, renders the interface, and coordinates between
//! the list view, the calendar board, the add-task form and dialogs.

use std::time::{Duration, Instant};

use chrono::{Local, Timelike};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use log::{debug, error};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::config::Config;
use crate::db::KeyValueStore;
use crate::errors::{Result, TaskError};
use crate::fields::*;
use crate::repository::TaskRepository;
use crate::task::Task;
use crate::tui::{
    calendar::CalendarView,
    colors::{named_color, theme, Theme, ROSE},
    enums::{AppState, ViewMode},
    task_form::FormView,
    utils::{centered_rect, greeting},
};
use crate::view::{format_age, project, CalendarGrid, CategoryFilter, ViewOptions};

const BANNER_DURATION: Duration = Duration::from_secs(3);

/// Main application state for the terminal user interface.
pub struct App<'r, S: KeyValueStore> {
    repo: &'r mut TaskRepository<S>,
    state: AppState,
    view_mode: ViewMode,
    options: ViewOptions,
    task_list_state: TableState,
    visible: Vec<String>,
    calendar: CalendarView,
    form: FormView,
    status_message: String,
    dark_mode: bool,
    banner_until: Option<Instant>,
    confirm_id: Option<String>,
}

impl<'r, S: KeyValueStore> App<'r, S> {
    pub fn new(repo: &'r mut TaskRepository<S>, config: &Config, start_in_calendar: bool) -> Self {
        let variant = repo.variant();
        let view_mode = if start_in_calendar {
            ViewMode::Calendar
        } else {
            ViewMode::from(variant)
        };
        let dark_mode = repo.store().load_dark_mode();
        let banner_until = config.welcome_banner.then(|| Instant::now() + BANNER_DURATION);

        let mut app = App {
            repo,
            state: AppState::TaskList,
            view_mode,
            options: config.view_options(),
            task_list_state: TableState::default(),
            visible: Vec::new(),
            calendar: CalendarView::new(),
            form: FormView::new(variant == Variant::Calendar),
            status_message: String::new(),
            dark_mode,
            banner_until,
            confirm_id: None,
        };
        app.refresh();
        app
    }

    fn theme(&self) -> Theme {
        theme(self.dark_mode)
    }

    /// Recompute the projection and keep the selection in range.
    fn refresh(&mut self) {
        self.visible = project(self.repo.tasks(), &self.options)
            .into_iter()
            .map(|t| t.id.clone())
            .collect();

        match self.task_list_state.selected() {
            _ if self.visible.is_empty() => self.task_list_state.select(None),
            Some(i) if i >= self.visible.len() => self.task_list_state.select(Some(self.visible.len() - 1)),
            None => self.task_list_state.select(Some(0)),
            _ => {}
        }

        let tasks = project(self.repo.tasks(), &self.options);
        let grid = CalendarGrid::build(&tasks);
        self.calendar.clamp(&grid);
    }

    /// Id of the highlighted task in the current view.
    fn selected_id(&self) -> Option<String> {
        match self.view_mode {
            ViewMode::List => self
                .task_list_state
                .selected()
                .and_then(|i| self.visible.get(i))
                .cloned(),
            ViewMode::Calendar => {
                let tasks = project(self.repo.tasks(), &self.options);
                let grid = CalendarGrid::build(&tasks);
                self.calendar.selected_task(&grid).map(|t| t.id.clone())
            }
        }
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    /// Show drained repository notifications, or the error of a failed mutation.
    fn after_mutation(&mut self, result: Result<()>) {
        match result {
            Ok(()) => {
                let notes: Vec<String> = self
                    .repo
                    .take_notifications()
                    .iter()
                    .map(|n| n.to_string())
                    .collect();
                if !notes.is_empty() {
                    self.set_status_message(notes.join(" | "));
                }
            }
            Err(e) => {
                error!("Mutation failed: {}", e);
                self.set_status_message(format!("Error: {}", e));
            }
        }
        self.refresh();
    }

    fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            let result = self.repo.toggle_completion(&id);
            self.after_mutation(result);
        }
    }

    fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
        if let Err(e) = self.repo.store_mut().save_dark_mode(self.dark_mode) {
            error!("Could not save theme: {}", e);
            self.set_status_message(format!("Error: {}", e));
        } else {
            let mode = if self.dark_mode { "Dark" } else { "Light" };
            self.set_status_message(format!("{} mode", mode));
        }
    }

    fn move_selection(&mut self, down: bool) {
        match self.view_mode {
            ViewMode::List => {
                if self.visible.is_empty() {
                    return;
                }
                let current = self.task_list_state.selected().unwrap_or(0);
                let next = if down {
                    (current + 1).min(self.visible.len() - 1)
                } else {
                    current.saturating_sub(1)
                };
                self.task_list_state.select(Some(next));
            }
            ViewMode::Calendar => {
                let tasks = project(self.repo.tasks(), &self.options);
                let grid = CalendarGrid::build(&tasks);
                self.calendar.move_card(down, &grid);
            }
        }
    }

    fn move_day(&mut self, right: bool) {
        if self.view_mode == ViewMode::Calendar {
            let tasks = project(self.repo.tasks(), &self.options);
            let grid = CalendarGrid::build(&tasks);
            self.calendar.move_day(right, &grid);
        }
    }

    /// Handle keys on the main board. Returns true if the app should quit.
    fn handle_task_list_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') | KeyCode::Esc => return true,

            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Left => self.move_day(false),
            KeyCode::Right => self.move_day(true),

            KeyCode::Char('a') => {
                self.form.open();
                self.state = AppState::AddTask;
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.confirm_id = Some(id);
                    self.state = AppState::Confirm;
                }
            }

            KeyCode::Char('f') => {
                self.options.category_filter = self.options.category_filter.next();
                self.refresh();
                self.set_status_message(format!("Filter: {}", self.options.category_filter.label()));
            }
            KeyCode::Char('s') => {
                self.options.sort = self.options.sort.next();
                self.refresh();
                self.set_status_message(format!("Sort: {}", self.options.sort.label()));
            }
            KeyCode::Char('c') => {
                self.options.show_completed = !self.options.show_completed;
                self.refresh();
                let status = if self.options.show_completed {
                    "Showing completed tasks"
                } else {
                    "Hiding completed tasks"
                };
                self.set_status_message(status.to_string());
            }
            KeyCode::Char('w') | KeyCode::Tab => {
                self.view_mode = self.view_mode.toggle();
                self.refresh();
            }
            KeyCode::Char('D') => self.toggle_dark_mode(),
            KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_form_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.form.cancel();
                self.state = AppState::TaskList;
            }
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Left => self.form.handle_left_right(false),
            KeyCode::Right => self.form.handle_left_right(true),
            KeyCode::Backspace => self.form.handle_backspace(),
            KeyCode::Delete => self.form.handle_delete(),
            KeyCode::Enter => match self.form.submit(&mut *self.repo) {
                Ok(Some(task)) => {
                    debug!("Created {} from form", task.id);
                    self.state = AppState::TaskList;
                    self.after_mutation(Ok(()));
                    if let Some(i) = self.visible.iter().position(|id| *id == task.id) {
                        self.task_list_state.select(Some(i));
                    }
                }
                Ok(None) => {}
                Err(e) => self.after_mutation(Err(e)),
            },
            KeyCode::Char(c) => self.form.handle_char(c),
            _ => {}
        }
    }

    fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(id) = self.confirm_id.take() {
                    let result = self.repo.delete(&id);
                    self.after_mutation(result);
                }
                self.state = AppState::TaskList;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = AppState::TaskList;
                self.confirm_id = None;
            }
            _ => {}
        }
    }

    fn handle_input(&mut self) -> Result<bool> {
        if !event::poll(Duration::from_millis(50))? {
            return Ok(false);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(false);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }
        if self.banner_until.take().is_some() {
            return Ok(false);
        }
        if self.state != AppState::AddTask {
            self.clear_status_message();
        }

        match self.state {
            AppState::TaskList => return Ok(self.handle_task_list_input(key.code, key.modifiers)),
            AppState::AddTask => self.handle_form_input(key.code),
            AppState::Help => self.state = AppState::TaskList,
            AppState::Confirm => self.handle_confirm_input(key.code),
        }
        Ok(false)
    }

    /// Title, greeting with the long date, stats and progress bar.
    fn render_header(&self, f: &mut Frame, area: Rect) {
        let theme = self.theme();
        let now = Local::now();
        let stats = self.repo.stats();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Length(1)])
            .split(area);

        let text = vec![
            Line::from(vec![
                Span::styled("ColorTask", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
                Span::raw("  "),
                Span::styled(
                    format!("{}! {}", greeting(now.hour()), now.format("%A, %B %-d, %Y")),
                    Style::default().add_modifier(Modifier::ITALIC),
                ),
            ]),
            Line::from(format!(
                "Total Tasks: {}   Completed: {}   Progress: {}%",
                stats.total, stats.completed, stats.percentage
            )),
        ];
        let header = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.muted)))
            .alignment(Alignment::Center);
        f.render_widget(header, chunks[0]);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(theme.accent).bg(theme.bg))
            .percent(stats.percentage.min(100) as u16)
            .label("");
        f.render_widget(gauge, chunks[1]);
    }

    fn controls_title(&self) -> String {
        format!(
            "{} ({}/{}) | f: {} | s: {} | c: {}",
            self.view_mode.title(),
            self.visible.len(),
            self.repo.tasks().len(),
            self.options.category_filter.label(),
            self.options.sort.label(),
            if self.options.show_completed { "shown" } else { "hidden" },
        )
    }

    fn empty_message(&self) -> String {
        match self.options.category_filter {
            CategoryFilter::All => "Your task list is empty. Add your first task to get started!".to_string(),
            CategoryFilter::Only(c) => format!("No {} tasks found. Try changing your filter.", c.name()),
        }
    }

    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let theme = self.theme();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.controls_title())
            .border_style(Style::default().fg(theme.muted));

        let tasks: Vec<&Task> = self
            .visible
            .iter()
            .filter_map(|id| self.repo.get(id))
            .collect();

        if tasks.is_empty() {
            let empty = Paragraph::new(self.empty_message())
                .block(block)
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.muted));
            f.render_widget(empty, area);
            return;
        }

        let header = Row::new(["", "Title", "Category", "Priority", "Created"].map(|h| {
            Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().fg(theme.bar_fg).bg(theme.accent));

        let now = chrono::Utc::now();
        let rows: Vec<Row> = tasks
            .iter()
            .map(|task| {
                let category = task.category.info();
                let priority = priority_info(task.priority.id());
                let mut title_style = Style::default().fg(theme.fg);
                if task.completed {
                    title_style = Style::default().fg(theme.muted).add_modifier(Modifier::CROSSED_OUT);
                }
                let title = if task.description.is_empty() {
                    Line::from(Span::styled(task.title.clone(), title_style))
                } else {
                    Line::from(vec![
                        Span::styled(task.title.clone(), title_style),
                        Span::styled(format!("  {}", task.description), Style::default().fg(theme.muted)),
                    ])
                };
                Row::new(vec![
                    Cell::from(if task.completed { "[x]" } else { "[ ]" }),
                    Cell::from(title),
                    Cell::from(task.category.name().to_string()).style(Style::default().fg(named_color(category.color))),
                    Cell::from(priority.name).style(Style::default().fg(named_color(priority.color))),
                    Cell::from(format_age(task.created_at, now)).style(Style::default().fg(theme.muted)),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Min(20),
            Constraint::Length(14),
            Constraint::Length(8),
            Constraint::Length(10),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, area, &mut self.task_list_state);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("ColorTask Help", bold)),
            Line::from(""),
            Line::from(Span::styled("Board:", bold)),
            Line::from("  ↑/k, ↓/j     Select task"),
            Line::from("  ←/→          Change day (calendar)"),
            Line::from("  Space/Enter  Toggle completion"),
            Line::from("  a            Add new task"),
            Line::from("  d/Delete     Delete selected task"),
            Line::from("  f            Cycle category filter"),
            Line::from("  s            Cycle sort (Newest, Oldest, Priority)"),
            Line::from("  c            Show/hide completed tasks"),
            Line::from("  w/Tab        Switch list and calendar view"),
            Line::from("  D            Toggle dark mode"),
            Line::from("  h/?/F1       Show this help"),
            Line::from("  q/Esc/Ctrl+C Quit"),
            Line::from(""),
            Line::from(Span::styled("Add Task Form:", bold)),
            Line::from("  Tab/↑/↓      Move between fields"),
            Line::from("  ←/→          Change category, priority, day or time"),
            Line::from("  Enter        Save task"),
            Line::from("  Esc          Cancel"),
        ];
        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Press any key to return"))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let title = self
            .confirm_id
            .as_deref()
            .and_then(|id| self.repo.get(id))
            .map(|t| t.title.as_str())
            .unwrap_or("");
        let area = centered_rect(50, 25, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled("Delete this task?", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(title.to_string()),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .title("Confirm Action")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(ROSE)),
            )
            .style(Style::default().bg(self.theme().bg).fg(self.theme().fg))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_banner(&self, f: &mut Frame, area: Rect) {
        let theme = self.theme();
        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Welcome to ColorTask",
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            )),
            Line::from("Organize your day colorfully"),
        ];
        let banner = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.accent)))
            .style(Style::default().bg(theme.bg).fg(theme.fg))
            .alignment(Alignment::Center);
        f.render_widget(banner, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let theme = self.theme();
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => "a: Add | Space: Toggle | d: Delete | w: View | D: Theme | h: Help".to_string(),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
            }
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(theme.accent).fg(theme.bar_fg))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render(&mut self, f: &mut Frame) {
        let theme = self.theme();
        f.render_widget(Block::default().style(Style::default().bg(theme.bg).fg(theme.fg)), f.area());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_header(f, chunks[0]);

        if self.state == AppState::Help {
            self.render_help(f, chunks[1]);
        } else {
            match self.view_mode {
                ViewMode::List => self.render_task_list(f, chunks[1]),
                ViewMode::Calendar => {
                    let block = Block::default()
                        .borders(Borders::ALL)
                        .title(self.controls_title())
                        .border_style(Style::default().fg(theme.muted));
                    let inner = block.inner(chunks[1]);
                    f.render_widget(block, chunks[1]);

                    let tasks = project(self.repo.tasks(), &self.options);
                    let grid = CalendarGrid::build(&tasks);
                    if grid.is_empty() {
                        let empty = Paragraph::new(self.empty_message())
                            .alignment(Alignment::Center)
                            .style(Style::default().fg(theme.muted));
                        f.render_widget(empty, inner);
                    } else {
                        self.calendar.render(f, inner, &grid, &theme);
                    }
                }
            }
        }

        match self.state {
            AppState::AddTask => self.form.render(f, chunks[1], &theme),
            AppState::Confirm => self.render_confirm(f, chunks[1]),
            _ => {}
        }
        if self.banner_until.is_some() {
            self.render_banner(f, chunks[1]);
        }

        self.render_status_bar(f, chunks[2]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering and input processing until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            if self.banner_until.is_some_and(|until| Instant::now() >= until) {
                self.banner_until = None;
            }
            terminal
                .draw(|f| self.render(f))
                .map_err(|e| TaskError::Terminal { message: e.to_string() })?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, TaskStore};
    use crate::repository::FixedColorPicker;

    fn repo(variant: Variant) -> TaskRepository<MemoryStore> {
        TaskRepository::open(
            TaskStore::new(MemoryStore::new()),
            variant,
            Box::new(FixedColorPicker(NoteColor::Blue)),
        )
        .unwrap()
    }

    fn quiet_config() -> Config {
        Config {
            welcome_banner: false,
            ..Config::default()
        }
    }

    #[test]
    fn test_seeded_list_projection_order() {
        let mut repo = repo(Variant::List);
        let app = App::new(&mut repo, &quiet_config(), false);
        assert_eq!(app.visible, vec!["1", "2", "3"]);
        assert_eq!(app.selected_id().as_deref(), Some("1"));
        assert_eq!(app.view_mode, ViewMode::List);
    }

    #[test]
    fn test_toggle_shows_notification_and_reorders() {
        let mut repo = repo(Variant::List);
        let mut app = App::new(&mut repo, &quiet_config(), false);
        app.handle_task_list_input(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(app.status_message, "Completed: Create project wireframes");
        assert_eq!(app.visible, vec!["2", "1", "3"]);
    }

    #[test]
    fn test_filter_and_hide_completed() {
        let mut repo = repo(Variant::List);
        let mut app = App::new(&mut repo, &quiet_config(), false);
        app.handle_task_list_input(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(app.visible, vec!["1", "2"]);
        app.handle_task_list_input(KeyCode::Char('f'), KeyModifiers::NONE);
        assert_eq!(app.options.category_filter, CategoryFilter::Only(Category::Work));
        assert_eq!(app.visible, vec!["1"]);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut repo = repo(Variant::List);
        let mut app = App::new(&mut repo, &quiet_config(), false);
        app.handle_task_list_input(KeyCode::Char('d'), KeyModifiers::NONE);
        assert_eq!(app.state, AppState::Confirm);
        app.handle_confirm_input(KeyCode::Char('n'));
        assert_eq!(app.visible.len(), 3);

        app.handle_task_list_input(KeyCode::Char('d'), KeyModifiers::NONE);
        app.handle_confirm_input(KeyCode::Char('y'));
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.visible, vec!["2", "3"]);
        assert_eq!(app.status_message, "Deleted: Create project wireframes");
    }

    #[test]
    fn test_form_submit_from_keys() {
        let mut repo = repo(Variant::Calendar);
        let mut app = App::new(&mut repo, &quiet_config(), false);
        assert_eq!(app.view_mode, ViewMode::Calendar);

        app.handle_task_list_input(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(app.state, AppState::AddTask);
        for c in "Swim".chars() {
            app.handle_form_input(KeyCode::Char(c));
        }
        app.handle_form_input(KeyCode::Enter);
        assert_eq!(app.state, AppState::AddTask);

        // focus is already on the category selector
        app.handle_form_input(KeyCode::Right);
        app.handle_form_input(KeyCode::Enter);
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.status_message, "Added: Swim");
        assert_eq!(app.repo.tasks()[0].color, Some(NoteColor::Blue));
    }

    #[test]
    fn test_dark_mode_persists() {
        let mut repo = repo(Variant::List);
        {
            let mut app = App::new(&mut repo, &quiet_config(), false);
            assert!(!app.dark_mode);
            app.handle_task_list_input(KeyCode::Char('D'), KeyModifiers::NONE);
            assert!(app.dark_mode);
        }
        assert!(repo.store().load_dark_mode());
    }
}
