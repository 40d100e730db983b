//! Derived, read-only projections over the task collection.
//!
//! [`project`] is the filter/sort pipeline shared by the list view, the CLI and
//! the calendar; [`CalendarGrid`] buckets its output into a 7 × 13 week grid.
//! Nothing here mutates tasks; every projection borrows from the repository.

use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Local, Utc};

use crate::fields::*;
use crate::task::Task;

/// Category restriction applied by the projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, category: &TaskCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *category == c,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::All => "All Categories",
            CategoryFilter::Only(c) => c.name(),
        }
    }

    /// Cycle All → Work → … → Entertainment → All.
    pub fn next(self) -> Self {
        match self {
            CategoryFilter::All => CategoryFilter::Only(Category::ALL[0]),
            CategoryFilter::Only(c) => {
                let idx = Category::ALL.iter().position(|x| *x == c).unwrap_or(0);
                Category::ALL
                    .get(idx + 1)
                    .map(|next| CategoryFilter::Only(*next))
                    .unwrap_or(CategoryFilter::All)
            }
        }
    }
}

impl From<Option<Category>> for CategoryFilter {
    fn from(category: Option<Category>) -> Self {
        category.map_or(CategoryFilter::All, CategoryFilter::Only)
    }
}

/// User-selected projection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub show_completed: bool,
    pub category_filter: CategoryFilter,
    pub sort: SortKey,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            show_completed: true,
            category_filter: CategoryFilter::All,
            sort: SortKey::Newest,
        }
    }
}

/// Incomplete tasks always come first; the sort key only orders within each group.
pub fn compare_tasks(a: &Task, b: &Task, sort: SortKey) -> Ordering {
    a.completed.cmp(&b.completed).then_with(|| match sort {
        SortKey::Newest => b.created_at.cmp(&a.created_at),
        SortKey::Oldest => a.created_at.cmp(&b.created_at),
        SortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
    })
}

/// Filter and sort tasks for display.
///
/// Applied in order: completion filter, category filter, then a stable sort.
pub fn project<'a>(tasks: &'a [Task], options: &ViewOptions) -> Vec<&'a Task> {
    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|t| options.show_completed || !t.completed)
        .filter(|t| options.category_filter.matches(&t.category))
        .collect();
    visible.sort_by(|a, b| compare_tasks(a, b, options.sort));
    visible
}

/// The grid cell a task lands in.
///
/// A time that is not one of the canonical slots goes to the first slot. A task
/// without a day (created by the list variant) is shown on the weekday it was
/// created.
// TODO: snap off-grid times to the nearest slot instead of the first one.
pub fn bucket_for(task: &Task) -> (Day, usize) {
    let day = task
        .day
        .unwrap_or_else(|| Day::from_weekday(task.created_at.with_timezone(&Local).weekday()));
    let slot = task.time.as_deref().and_then(slot_index).unwrap_or(0);
    (day, slot)
}

/// Tasks bucketed by weekday × time slot.
#[derive(Debug, Clone)]
pub struct CalendarGrid<'a> {
    cells: Vec<Vec<Vec<&'a Task>>>,
}

impl<'a> CalendarGrid<'a> {
    /// Bucket already-projected tasks. Order inside a cell follows the input order.
    pub fn build(tasks: &[&'a Task]) -> Self {
        let mut cells = vec![vec![Vec::new(); TIME_SLOTS.len()]; Day::ALL.len()];
        for &task in tasks {
            let (day, slot) = bucket_for(task);
            cells[day.index()][slot].push(task);
        }
        Self { cells }
    }

    pub fn cell(&self, day: Day, slot: usize) -> &[&'a Task] {
        self.cells[day.index()]
            .get(slot)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All tasks for one day, slot by slot.
    pub fn day_tasks(&self, day: Day) -> Vec<(usize, &'a Task)> {
        (0..TIME_SLOTS.len())
            .flat_map(|slot| self.cell(day, slot).iter().map(move |t| (slot, *t)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cells.iter().flatten().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Format a creation timestamp relative to `now` ("today", "yesterday", "3d ago").
pub fn format_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now.with_timezone(&Local).date_naive() - created_at.with_timezone(&Local).date_naive())
        .num_days();
    match days {
        d if d <= 0 => "today".into(),
        1 => "yesterday".into(),
        d => format!("{}d ago", d),
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task]) {
    println!(
        "{:<14} {:<4} {:<7} {:<14} {:<10} {}",
        "ID", "Done", "Pri", "Category", "Created", "Title"
    );
    let now = Utc::now();
    for t in tasks {
        let done = if t.completed { "[x]" } else { "[ ]" };
        println!(
            "{:<14} {:<4} {:<7} {:<14} {:<10} {}",
            t.id,
            done,
            t.priority.name(),
            t.category.name(),
            format_age(t.created_at, now),
            t.title
        );
        if !t.description.is_empty() {
            println!("{:>52}{}", "", truncate(&t.description, 60));
        }
    }
}

/// Print the week grid, one block per day, skipping empty slots.
pub fn print_week(grid: &CalendarGrid) {
    for day in Day::ALL {
        println!("== {} ==", day.name());
        let entries = grid.day_tasks(day);
        if entries.is_empty() {
            println!("   (nothing planned)");
            continue;
        }
        for (slot, t) in entries {
            let done = if t.completed { "[x]" } else { "[ ]" };
            let color = t
                .color
                .map(|c| format!("{:?}", c).to_lowercase())
                .unwrap_or_else(|| "-".into());
            println!(
                "   {:>8}  {} {:<40} {:<8} {}",
                TIME_SLOTS[slot],
                done,
                truncate(&t.title, 40),
                color,
                t.id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn task(id: &str, category: Category, priority: Priority, completed: bool, hours: i64) -> Task {
        Task {
            id: id.into(),
            title: format!("task {}", id),
            description: String::new(),
            category: category.into(),
            priority,
            completed,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours),
            day: None,
            time: None,
            color: None,
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    fn fixture() -> Vec<Task> {
        vec![
            task("a", Category::Work, Priority::Low, false, 1),
            task("b", Category::Work, Priority::High, true, 5),
            task("c", Category::Health, Priority::Medium, false, 3),
            task("d", Category::Work, Priority::High, false, 2),
            task("e", Category::Work, Priority::Medium, false, 4),
        ]
    }

    #[test]
    fn test_incomplete_before_complete_for_every_key() {
        let tasks = fixture();
        for sort in [SortKey::Newest, SortKey::Oldest, SortKey::Priority] {
            let options = ViewOptions {
                sort,
                ..ViewOptions::default()
            };
            let out = project(&tasks, &options);
            let first_done = out.iter().position(|t| t.completed).unwrap();
            assert!(out[first_done..].iter().all(|t| t.completed), "{:?}", sort);
            assert_eq!(out.len(), tasks.len());
        }
    }

    #[test]
    fn test_sort_keys() {
        let tasks = fixture();
        let newest = project(&tasks, &ViewOptions::default());
        assert_eq!(ids(&newest), vec!["e", "c", "d", "a", "b"]);

        let oldest = project(
            &tasks,
            &ViewOptions {
                sort: SortKey::Oldest,
                ..ViewOptions::default()
            },
        );
        assert_eq!(ids(&oldest), vec!["a", "d", "c", "e", "b"]);

        let by_priority = project(
            &tasks,
            &ViewOptions {
                sort: SortKey::Priority,
                ..ViewOptions::default()
            },
        );
        // c and e tie on medium and keep their input order.
        assert_eq!(ids(&by_priority), vec!["d", "c", "e", "a", "b"]);
    }

    #[test]
    fn test_work_filter_hides_completed() {
        let tasks = fixture();
        let options = ViewOptions {
            show_completed: false,
            category_filter: CategoryFilter::Only(Category::Work),
            sort: SortKey::Newest,
        };
        let out = project(&tasks, &options);
        assert_eq!(ids(&out), vec!["e", "d", "a"]);
        assert!(out.iter().all(|t| !t.completed && t.category == Category::Work));
    }

    #[test]
    fn test_unknown_category_only_shows_unfiltered() {
        let mut tasks = fixture();
        tasks[0].category = TaskCategory::Unknown("gardening".into());
        let all = project(&tasks, &ViewOptions::default());
        assert!(all.iter().any(|t| t.id == "a"));

        let options = ViewOptions {
            category_filter: CategoryFilter::Only(Category::Work),
            ..ViewOptions::default()
        };
        assert!(project(&tasks, &options).iter().all(|t| t.id != "a"));
    }

    #[test]
    fn test_category_filter_cycle() {
        let mut filter = CategoryFilter::All;
        let mut seen = Vec::new();
        for _ in 0..7 {
            filter = filter.next();
            seen.push(filter);
        }
        assert_eq!(seen[0], CategoryFilter::Only(Category::Work));
        assert_eq!(seen[5], CategoryFilter::Only(Category::Entertainment));
        assert_eq!(seen[6], CategoryFilter::All);
        assert_eq!(CategoryFilter::from(None), CategoryFilter::All);
    }

    #[test]
    fn test_off_grid_time_goes_to_first_slot() {
        let mut t = task("x", Category::Work, Priority::Medium, false, 0);
        t.day = Some(Day::Thursday);
        t.time = Some("11:45 AM".into());
        let refs = vec![&t];
        let grid = CalendarGrid::build(&refs);
        assert_eq!(grid.cell(Day::Thursday, 0).len(), 1);
        assert_eq!(grid.cell(Day::Thursday, 0)[0].id, "x");
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_grid_keeps_projection_order_in_cells() {
        let mut tasks = fixture();
        for t in tasks.iter_mut() {
            t.day = Some(Day::Monday);
            t.time = Some("2:00 PM".into());
        }
        let projected = project(&tasks, &ViewOptions::default());
        let grid = CalendarGrid::build(&projected);
        let slot = slot_index("2:00 PM").unwrap();
        assert_eq!(ids(grid.cell(Day::Monday, slot)), ids(&projected));
        assert!(grid.cell(Day::Tuesday, slot).is_empty());
        assert!(grid.cell(Day::Monday, 99).is_empty());
    }

    #[test]
    fn test_task_without_day_uses_creation_weekday() {
        let t = task("y", Category::Personal, Priority::Low, false, 0);
        let (day, slot) = bucket_for(&t);
        let expected = Day::from_weekday(t.created_at.with_timezone(&Local).weekday());
        assert_eq!(day, expected);
        assert_eq!(slot, 0);
    }

    #[test]
    fn test_format_age() {
        let now = Utc::now();
        assert_eq!(format_age(now, now), "today");
        assert_eq!(format_age(now - Duration::days(1), now), "yesterday");
        assert_eq!(format_age(now - Duration::days(4), now), "4d ago");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
