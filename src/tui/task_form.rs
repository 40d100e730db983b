//! Add-task form for the terminal user interface.
//!
//! `FormView` owns the text inputs and selector positions; every edit is
//! forwarded to the [`TaskForm`] controller as a [`FieldChange`], so validation
//! and commit rules live in one place.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::db::KeyValueStore;
use crate::errors::Result;
use crate::fields::*;
use crate::form::{FieldChange, TaskForm};
use crate::repository::TaskRepository;
use crate::task::{FormField, Task};
use crate::tui::{
    colors::{named_color, Theme, ROSE},
    input::InputField,
    utils::centered_rect,
};

/// Focus order of the form fields.
pub const TITLE_ORDER: usize = 0;
pub const DESCRIPTION_ORDER: usize = 1;
pub const CATEGORY_ORDER: usize = 2;
pub const PRIORITY_ORDER: usize = 3;
pub const DAY_ORDER: usize = 4;
pub const TIME_ORDER: usize = 5;

pub struct FormView {
    form: TaskForm,
    pub title: InputField,
    pub description: InputField,
    pub current_field: usize,
    calendar: bool,
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, right: bool) -> T {
    let i = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if right {
        (i + 1) % all.len()
    } else if i == 0 {
        all.len() - 1
    } else {
        i - 1
    };
    all[next]
}

impl FormView {
    /// `calendar` adds the day and time selectors.
    pub fn new(calendar: bool) -> Self {
        Self {
            form: TaskForm::new(),
            title: InputField::new(),
            description: InputField::new(),
            current_field: TITLE_ORDER,
            calendar,
        }
    }

    #[cfg(test)]
    pub fn form(&self) -> &TaskForm {
        &self.form
    }

    pub fn is_open(&self) -> bool {
        self.form.is_open()
    }

    pub fn field_count(&self) -> usize {
        if self.calendar {
            6
        } else {
            4
        }
    }

    /// Open the form, picking up whatever draft was left by a cancel.
    pub fn open(&mut self) {
        self.form.open();
        let draft = self.form.draft();
        self.title = InputField::with_value(&draft.title);
        self.description = InputField::with_value(&draft.description);
        self.current_field = TITLE_ORDER;
    }

    pub fn cancel(&mut self) {
        self.form.cancel();
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % self.field_count();
    }

    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            self.field_count() - 1
        } else {
            self.current_field - 1
        };
    }

    fn active_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_ORDER => Some(&mut self.title),
            DESCRIPTION_ORDER => Some(&mut self.description),
            _ => None,
        }
    }

    fn sync_text(&mut self) {
        let change = match self.current_field {
            TITLE_ORDER => FieldChange::Title(self.title.value.clone()),
            DESCRIPTION_ORDER => FieldChange::Description(self.description.value.clone()),
            _ => return,
        };
        self.form.update(change);
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(input) = self.active_input() {
            input.handle_char(c);
            self.sync_text();
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(input) = self.active_input() {
            input.handle_backspace();
            self.sync_text();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(input) = self.active_input() {
            input.handle_delete();
            self.sync_text();
        }
    }

    /// Move the text cursor, or cycle the focused selector.
    pub fn handle_left_right(&mut self, right: bool) {
        let draft = self.form.draft().clone();
        let change = match self.current_field {
            TITLE_ORDER | DESCRIPTION_ORDER => {
                if let Some(input) = self.active_input() {
                    if right {
                        input.move_cursor_right();
                    } else {
                        input.move_cursor_left();
                    }
                }
                return;
            }
            CATEGORY_ORDER => {
                let mut options: Vec<Option<Category>> = vec![None];
                options.extend(Category::ALL.iter().copied().map(Some));
                FieldChange::Category(cycle(&options, draft.category, right))
            }
            PRIORITY_ORDER => FieldChange::Priority(cycle(&Priority::ALL, draft.priority, right)),
            DAY_ORDER => FieldChange::Day(cycle(&Day::ALL, draft.day, right)),
            TIME_ORDER => {
                let current = TIME_SLOTS
                    .iter()
                    .copied()
                    .find(|slot| *slot == draft.time)
                    .unwrap_or(DEFAULT_TIME_SLOT);
                FieldChange::Time(cycle(&TIME_SLOTS, current, right).to_string())
            }
            _ => return,
        };
        self.form.update(change);
    }

    /// Validate and commit. On failure, focus moves to the first field with a message.
    pub fn submit<S: KeyValueStore>(&mut self, repo: &mut TaskRepository<S>) -> Result<Option<Task>> {
        let created = self.form.submit(repo)?;
        match created {
            Some(_) => {
                self.title.clear();
                self.description.clear();
                self.current_field = TITLE_ORDER;
            }
            None => {
                if let Some((field, _)) = self.form.errors().iter().next() {
                    self.current_field = match field {
                        FormField::Title => TITLE_ORDER,
                        FormField::Description => DESCRIPTION_ORDER,
                        FormField::Category => CATEGORY_ORDER,
                        FormField::Priority => PRIORITY_ORDER,
                        FormField::Day => DAY_ORDER,
                        FormField::Time => TIME_ORDER,
                    };
                }
            }
        }
        Ok(created)
    }

    fn field_block<'a>(&self, order: usize, label: &'a str, field: FormField, theme: &Theme) -> Block<'a> {
        let mut border = Style::default().fg(theme.muted);
        if order == self.current_field {
            border = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
        }
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(label)
            .border_style(border);
        if let Some(message) = self.form.errors().get(field) {
            block = block
                .border_style(Style::default().fg(ROSE))
                .title_bottom(Line::from(message.to_string()).style(Style::default().fg(ROSE)));
        }
        block
    }

    /// Draw the form as a centered popup over `area`.
    pub fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let popup = centered_rect(60, 80, area);
        f.render_widget(Clear, popup);

        let outer = Block::default()
            .borders(Borders::ALL)
            .title("Add New Task")
            .style(Style::default().bg(theme.bg).fg(theme.fg));
        let inner = outer.inner(popup);
        f.render_widget(outer, popup);

        let mut constraints = vec![Constraint::Length(3); self.field_count()];
        constraints.push(Constraint::Min(1));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let draft = self.form.draft();

        let title = Paragraph::new(self.title.value.as_str())
            .block(self.field_block(TITLE_ORDER, "Title *", FormField::Title, theme));
        f.render_widget(title, chunks[TITLE_ORDER]);

        let description = Paragraph::new(self.description.value.as_str())
            .block(self.field_block(DESCRIPTION_ORDER, "Description", FormField::Description, theme));
        f.render_widget(description, chunks[DESCRIPTION_ORDER]);

        let (category_text, category_style) = match draft.category {
            Some(c) => (
                format!("< {} >", c.name()),
                Style::default().fg(named_color(category_info(c.id()).color)),
            ),
            None => ("< Select a category >".to_string(), Style::default().fg(theme.muted)),
        };
        let category = Paragraph::new(category_text)
            .style(category_style)
            .block(self.field_block(CATEGORY_ORDER, "Category *", FormField::Category, theme));
        f.render_widget(category, chunks[CATEGORY_ORDER]);

        let priority = Paragraph::new(format!("< {} >", draft.priority.name()))
            .style(Style::default().fg(named_color(priority_info(draft.priority.id()).color)))
            .block(self.field_block(PRIORITY_ORDER, "Priority", FormField::Priority, theme));
        f.render_widget(priority, chunks[PRIORITY_ORDER]);

        if self.calendar {
            let day = Paragraph::new(format!("< {} >", draft.day.name()))
                .block(self.field_block(DAY_ORDER, "Day", FormField::Day, theme));
            f.render_widget(day, chunks[DAY_ORDER]);

            let time = Paragraph::new(format!("< {} >", draft.time))
                .block(self.field_block(TIME_ORDER, "Time", FormField::Time, theme));
            f.render_widget(time, chunks[TIME_ORDER]);
        }

        let help = Paragraph::new("Tab/↑↓ move  ←/→ change  Enter save  Esc cancel")
            .style(Style::default().fg(theme.muted));
        f.render_widget(help, chunks[self.field_count()]);

        if let Some(input) = match self.current_field {
            TITLE_ORDER => Some(&self.title),
            DESCRIPTION_ORDER => Some(&self.description),
            _ => None,
        } {
            let area = chunks[self.current_field];
            f.set_cursor_position((area.x + 1 + input.cursor as u16, area.y + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, TaskStore, TASKS_KEY};
    use crate::repository::FixedColorPicker;

    fn repo(variant: Variant) -> TaskRepository<MemoryStore> {
        let mut kv = MemoryStore::new();
        kv.set(TASKS_KEY, "[]").unwrap();
        TaskRepository::open(TaskStore::new(kv), variant, Box::new(FixedColorPicker(NoteColor::Pink)))
            .unwrap()
    }

    fn type_text(view: &mut FormView, text: &str) {
        for c in text.chars() {
            view.handle_char(c);
        }
    }

    #[test]
    fn test_typing_flows_into_draft() {
        let mut view = FormView::new(false);
        view.open();
        type_text(&mut view, "Stretch");
        view.next_field();
        type_text(&mut view, "10 min");
        view.handle_backspace();
        assert_eq!(view.form().draft().title, "Stretch");
        assert_eq!(view.form().draft().description, "10 mi");
    }

    #[test]
    fn test_selectors_cycle_and_wrap() {
        let mut view = FormView::new(true);
        view.open();
        view.current_field = CATEGORY_ORDER;
        view.handle_left_right(true);
        assert_eq!(view.form().draft().category, Some(Category::Work));
        view.handle_left_right(false);
        view.handle_left_right(false);
        assert_eq!(view.form().draft().category, Some(Category::Entertainment));

        view.current_field = TIME_ORDER;
        view.handle_left_right(true);
        assert_eq!(view.form().draft().time, "10:00 AM");

        view.current_field = PRIORITY_ORDER;
        view.handle_left_right(true);
        assert_eq!(view.form().draft().priority, Priority::High);
    }

    #[test]
    fn test_failed_submit_focuses_first_error() {
        let mut repo = repo(Variant::List);
        let mut view = FormView::new(false);
        view.open();
        type_text(&mut view, "Laundry");
        view.next_field();
        assert_eq!(view.submit(&mut repo).unwrap(), None);
        assert_eq!(view.current_field, CATEGORY_ORDER);
        assert!(view.is_open());
    }

    #[test]
    fn test_submit_then_reopen_is_blank() {
        let mut repo = repo(Variant::Calendar);
        let mut view = FormView::new(true);
        view.open();
        type_text(&mut view, "Yoga");
        view.current_field = CATEGORY_ORDER;
        view.handle_left_right(true);
        let task = view.submit(&mut repo).unwrap().unwrap();
        assert_eq!(task.color, Some(NoteColor::Pink));
        assert!(!view.is_open());

        view.open();
        assert!(view.title.value.is_empty());
    }

    #[test]
    fn test_cancel_keeps_typed_text() {
        let mut view = FormView::new(false);
        view.open();
        type_text(&mut view, "Half");
        view.cancel();
        view.open();
        assert_eq!(view.title.value, "Half");
        assert_eq!(view.title.cursor, 4);
    }
}
