//! Weekly calendar board.
//!
//! Seven columns, Monday first, each holding the day's sticky notes in slot
//! order. Arrow keys move between days and between notes within a day.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::fields::*;
use crate::task::Task;
use crate::tui::colors::{note_color, Theme};
use crate::view::CalendarGrid;

const CARD_HEIGHT: usize = 5;

pub struct CalendarView {
    pub selected_day: Day,
    pub selected_card: usize,
    scroll_offsets: [usize; 7],
}

impl Default for CalendarView {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarView {
    /// Start on today's column.
    pub fn new() -> Self {
        Self {
            selected_day: Day::today(),
            selected_card: 0,
            scroll_offsets: [0; 7],
        }
    }

    pub fn move_day(&mut self, right: bool, grid: &CalendarGrid) {
        let i = self.selected_day.index();
        let next = if right { (i + 1) % 7 } else { (i + 6) % 7 };
        self.selected_day = Day::ALL[next];
        self.selected_card = 0;
        self.clamp(grid);
    }

    pub fn move_card(&mut self, down: bool, grid: &CalendarGrid) {
        if down {
            self.selected_card += 1;
        } else {
            self.selected_card = self.selected_card.saturating_sub(1);
        }
        self.clamp(grid);
    }

    /// Keep the selection on an existing card after the grid changed.
    pub fn clamp(&mut self, grid: &CalendarGrid) {
        let len = grid.day_tasks(self.selected_day).len();
        if len == 0 {
            self.selected_card = 0;
            self.scroll_offsets[self.selected_day.index()] = 0;
        } else if self.selected_card >= len {
            self.selected_card = len - 1;
        }
    }

    pub fn selected_task<'a>(&self, grid: &CalendarGrid<'a>) -> Option<&'a Task> {
        grid.day_tasks(self.selected_day)
            .get(self.selected_card)
            .map(|(_, task)| *task)
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, grid: &CalendarGrid, theme: &Theme) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 7); 7])
            .split(area);

        for (day, &column_area) in Day::ALL.iter().zip(columns.iter()) {
            self.render_column(f, column_area, *day, grid, theme);
        }
    }

    fn render_column(&mut self, f: &mut Frame, area: Rect, day: Day, grid: &CalendarGrid, theme: &Theme) {
        let is_selected = day == self.selected_day;
        let is_today = day == Day::today();

        let mut border_style = Style::default().fg(theme.muted);
        if is_selected {
            border_style = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
        }
        let title = if is_today {
            format!("{} •", day.name())
        } else {
            day.name().to_string()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let cards = grid.day_tasks(day);
        if cards.is_empty() {
            return;
        }

        let available_height = inner.height as usize;
        let visible_cards = (available_height / CARD_HEIGHT).max(1);

        let column = day.index();
        let scroll_offset = if is_selected {
            let start = self.scroll_offsets[column];
            if self.selected_card < start {
                self.scroll_offsets[column] = self.selected_card;
            } else if self.selected_card >= start + visible_cards {
                self.scroll_offsets[column] = self.selected_card + 1 - visible_cards;
            }
            self.scroll_offsets[column]
        } else {
            self.scroll_offsets[column].min(cards.len().saturating_sub(1))
        };

        let mut current_y = 0;
        let mut rendered = 0;
        for (index, (slot, task)) in cards.iter().enumerate().skip(scroll_offset) {
            if current_y + CARD_HEIGHT > available_height {
                break;
            }
            let card_area = Rect {
                x: inner.x,
                y: inner.y + current_y as u16,
                width: inner.width,
                height: CARD_HEIGHT as u16,
            };
            let selected = is_selected && index == self.selected_card;
            render_card(f, card_area, task, TIME_SLOTS[*slot], selected, theme);
            current_y += CARD_HEIGHT;
            rendered += 1;
        }

        let remaining = cards.len() - scroll_offset - rendered;
        if remaining > 0 && inner.height > 0 {
            let indicator = Paragraph::new(format!("▼ +{}", remaining)).style(Style::default().fg(theme.accent));
            f.render_widget(
                indicator,
                Rect {
                    x: inner.x,
                    y: inner.y + inner.height - 1,
                    width: inner.width,
                    height: 1,
                },
            );
        }
    }
}

/// One sticky note: slot and category icon, then the title.
fn render_card(f: &mut Frame, area: Rect, task: &Task, slot: &str, selected: bool, theme: &Theme) {
    let bg = task.color.map(note_color).unwrap_or(theme.muted);
    let mut style = Style::default().bg(bg).fg(Color::Black);
    if task.completed {
        style = style.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM);
    }
    let mut border = Style::default().fg(Color::Black);
    if selected {
        border = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    }

    let info = task.category.info();
    let text = vec![
        Line::from(format!("{} · {}", slot, info.icon)).style(Style::default().add_modifier(Modifier::ITALIC)),
        Line::from(task.title.clone()),
    ];
    let card = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).border_style(border))
        .style(style)
        .wrap(Wrap { trim: true });
    f.render_widget(card, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn note(id: &str, day: Day, time: &str) -> Task {
        Task {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            category: Category::Personal.into(),
            priority: Priority::Medium,
            completed: false,
            created_at: Utc::now(),
            day: Some(day),
            time: Some(time.into()),
            color: Some(NoteColor::Yellow),
        }
    }

    #[test]
    fn test_navigation_wraps_and_clamps() {
        let tasks = vec![
            note("a", Day::Monday, "9:00 AM"),
            note("b", Day::Monday, "8:00 AM"),
            note("c", Day::Sunday, "1:00 PM"),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let grid = CalendarGrid::build(&refs);

        let mut view = CalendarView::new();
        view.selected_day = Day::Monday;
        assert_eq!(view.selected_task(&grid).map(|t| t.id.as_str()), Some("b"));
        view.move_card(true, &grid);
        view.move_card(true, &grid);
        assert_eq!(view.selected_task(&grid).map(|t| t.id.as_str()), Some("a"));

        view.move_day(false, &grid);
        assert_eq!(view.selected_day, Day::Sunday);
        assert_eq!(view.selected_task(&grid).map(|t| t.id.as_str()), Some("c"));

        view.move_day(true, &grid);
        view.move_day(true, &grid);
        assert_eq!(view.selected_day, Day::Tuesday);
        assert!(view.selected_task(&grid).is_none());
    }
}
