//! Enumerations, fixed lookup tables and field types for tasks.
//!
//! Categories, priorities, weekdays, calendar time slots and sticky-note colors
//! are all closed sets. The display lookups that take a raw id string fall back to
//! a neutral entry instead of failing, so stale or hand-edited data still renders.

use chrono::{Datelike, Local, Weekday};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task categories. The serialized ids are the lowercase names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
    Learning,
    Health,
    Errands,
    Entertainment,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Work,
        Category::Personal,
        Category::Learning,
        Category::Health,
        Category::Errands,
        Category::Entertainment,
    ];

    /// Stable storage id, e.g. `"errands"`.
    pub fn id(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Learning => "learning",
            Category::Health => "health",
            Category::Errands => "errands",
            Category::Entertainment => "entertainment",
        }
    }

    /// Parse a storage id. Unknown ids yield `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.id() == id)
    }

    pub fn name(self) -> &'static str {
        category_info(self.id()).name
    }
}

/// The category stored on a task.
///
/// Ids outside [`Category`] are kept verbatim so a hand-edited record still
/// loads, renders with the fallback lookup and is written back unchanged. New
/// tasks only ever get a `Known` category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskCategory {
    Known(Category),
    Unknown(String),
}

impl TaskCategory {
    pub fn id(&self) -> &str {
        match self {
            TaskCategory::Known(c) => c.id(),
            TaskCategory::Unknown(id) => id,
        }
    }

    pub fn known(&self) -> Option<Category> {
        match self {
            TaskCategory::Known(c) => Some(*c),
            TaskCategory::Unknown(_) => None,
        }
    }

    /// Display name. Unknown ids show as themselves.
    pub fn name(&self) -> &str {
        match self {
            TaskCategory::Known(c) => c.name(),
            TaskCategory::Unknown(id) => id,
        }
    }

    pub fn info(&self) -> CategoryInfo {
        category_info(self.id())
    }
}

impl From<Category> for TaskCategory {
    fn from(category: Category) -> Self {
        TaskCategory::Known(category)
    }
}

impl From<String> for TaskCategory {
    fn from(id: String) -> Self {
        match Category::from_id(&id) {
            Some(category) => TaskCategory::Known(category),
            None => TaskCategory::Unknown(id),
        }
    }
}

impl From<TaskCategory> for String {
    fn from(category: TaskCategory) -> Self {
        category.id().to_string()
    }
}

impl PartialEq<Category> for TaskCategory {
    fn eq(&self, other: &Category) -> bool {
        self.known() == Some(*other)
    }
}

/// Priority classification for task importance.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn id(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Sort rank: high first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn name(self) -> &'static str {
        priority_info(self.id()).name
    }
}

/// Days of the calendar week, Monday first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    /// Column position in the week grid.
    pub fn index(self) -> usize {
        self.weekday().num_days_from_monday() as usize
    }

    pub fn weekday(self) -> Weekday {
        match self {
            Day::Monday => Weekday::Mon,
            Day::Tuesday => Weekday::Tue,
            Day::Wednesday => Weekday::Wed,
            Day::Thursday => Weekday::Thu,
            Day::Friday => Weekday::Fri,
            Day::Saturday => Weekday::Sat,
            Day::Sunday => Weekday::Sun,
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        Self::ALL[weekday.num_days_from_monday() as usize]
    }

    /// The current local weekday.
    pub fn today() -> Self {
        Self::from_weekday(Local::now().weekday())
    }
}

/// The 13 hourly calendar slots, in display order.
pub const TIME_SLOTS: [&str; 13] = [
    "8:00 AM", "9:00 AM", "10:00 AM", "11:00 AM", "12:00 PM", "1:00 PM", "2:00 PM",
    "3:00 PM", "4:00 PM", "5:00 PM", "6:00 PM", "7:00 PM", "8:00 PM",
];

/// Slot preselected for new calendar tasks.
pub const DEFAULT_TIME_SLOT: &str = "9:00 AM";

/// Position of `time` in [`TIME_SLOTS`], if it is a canonical slot.
pub fn slot_index(time: &str) -> Option<usize> {
    TIME_SLOTS.iter().position(|slot| *slot == time)
}

/// Sticky-note colors for calendar tasks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    Yellow,
    Pink,
    Blue,
    Green,
    Purple,
    Orange,
}

impl NoteColor {
    pub const ALL: [NoteColor; 6] = [
        NoteColor::Yellow,
        NoteColor::Pink,
        NoteColor::Blue,
        NoteColor::Green,
        NoteColor::Purple,
        NoteColor::Orange,
    ];
}

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Priority,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Newest => "Newest First",
            SortKey::Oldest => "Oldest First",
            SortKey::Priority => "By Priority",
        }
    }

    /// Next key in the cycle used by the TUI sort toggle.
    pub fn next(self) -> Self {
        match self {
            SortKey::Newest => SortKey::Oldest,
            SortKey::Oldest => SortKey::Priority,
            SortKey::Priority => SortKey::Newest,
        }
    }
}

/// Which presentation the application runs as. The calendar variant gives new
/// tasks a day, a time slot and a sticky-note color.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    List,
    Calendar,
}

/// Display metadata for a category id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

const CATEGORY_TABLE: [CategoryInfo; 6] = [
    CategoryInfo { id: "work", name: "Work", icon: "Briefcase", color: "indigo" },
    CategoryInfo { id: "personal", name: "Personal", icon: "User", color: "green" },
    CategoryInfo { id: "learning", name: "Learning", icon: "BookOpen", color: "purple" },
    CategoryInfo { id: "health", name: "Health", icon: "Heart", color: "rose" },
    CategoryInfo { id: "errands", name: "Errands", icon: "ShoppingBag", color: "amber" },
    CategoryInfo { id: "entertainment", name: "Entertainment", icon: "Film", color: "cyan" },
];

const UNKNOWN_CATEGORY: CategoryInfo = CategoryInfo {
    id: "",
    name: "",
    icon: "Circle",
    color: "gray",
};

/// Look up display metadata for a category id, falling back to a neutral entry.
pub fn category_info(id: &str) -> CategoryInfo {
    CATEGORY_TABLE
        .iter()
        .find(|info| info.id == id)
        .copied()
        .unwrap_or(UNKNOWN_CATEGORY)
}

/// Display metadata for a priority id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub color: &'static str,
}

const PRIORITY_TABLE: [PriorityInfo; 3] = [
    PriorityInfo { id: "low", name: "Low", color: "green" },
    PriorityInfo { id: "medium", name: "Medium", color: "amber" },
    PriorityInfo { id: "high", name: "High", color: "rose" },
];

const UNKNOWN_PRIORITY: PriorityInfo = PriorityInfo {
    id: "",
    name: "-",
    color: "gray",
};

/// Look up display metadata for a priority id, falling back to a neutral entry.
pub fn priority_info(id: &str) -> PriorityInfo {
    PRIORITY_TABLE
        .iter()
        .find(|info| info.id == id)
        .copied()
        .unwrap_or(UNKNOWN_PRIORITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_lookup_with_fallback() {
        assert_eq!(category_info("work").icon, "Briefcase");
        assert_eq!(category_info("entertainment").color, "cyan");
        let unknown = category_info("gardening");
        assert_eq!(unknown.icon, "Circle");
        assert_eq!(unknown.color, "gray");
        assert_eq!(category_info("").icon, "Circle");
    }

    #[test]
    fn test_category_ids_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_id(category.id()), Some(category));
            assert_eq!(category_info(category.id()).id, category.id());
        }
        assert_eq!(Category::from_id("Work"), None);
    }

    #[test]
    fn test_task_category_keeps_unknown_ids() {
        let known: TaskCategory = serde_json::from_str("\"health\"").unwrap();
        assert_eq!(known, Category::Health);
        assert_eq!(known.info().icon, "Heart");

        let unknown: TaskCategory = serde_json::from_str("\"gardening\"").unwrap();
        assert_eq!(unknown, TaskCategory::Unknown("gardening".into()));
        assert_eq!(unknown.known(), None);
        assert_eq!(unknown.name(), "gardening");
        assert_eq!(unknown.info().icon, "Circle");
        assert_eq!(serde_json::to_string(&unknown).unwrap(), "\"gardening\"");
    }

    #[test]
    fn test_priority_rank_and_lookup() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(priority_info("high").color, "rose");
        assert_eq!(priority_info("urgent").name, "-");
    }

    #[test]
    fn test_time_slots() {
        assert_eq!(TIME_SLOTS.len(), 13);
        assert_eq!(TIME_SLOTS[0], "8:00 AM");
        assert_eq!(TIME_SLOTS[12], "8:00 PM");
        assert_eq!(slot_index(DEFAULT_TIME_SLOT), Some(1));
        assert_eq!(slot_index("11:45 AM"), None);
    }

    #[test]
    fn test_day_weekday_mapping() {
        for (i, day) in Day::ALL.iter().enumerate() {
            assert_eq!(day.index(), i);
            assert_eq!(Day::from_weekday(day.weekday()), *day);
        }
        assert_eq!(serde_json::to_string(&Day::Wednesday).unwrap(), "\"Wednesday\"");
    }

    #[test]
    fn test_sort_key_cycle() {
        assert_eq!(SortKey::Newest.next(), SortKey::Oldest);
        assert_eq!(SortKey::Oldest.next(), SortKey::Priority);
        assert_eq!(SortKey::Priority.next(), SortKey::Newest);
    }
}
