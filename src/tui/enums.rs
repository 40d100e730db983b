//! Enumerations for TUI state management.

use crate::fields::Variant;

/// Which screen currently receives input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    TaskList,
    AddTask,
    Help,
    Confirm,
}

/// Main body presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    List,
    Calendar,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::List => ViewMode::Calendar,
            ViewMode::Calendar => ViewMode::List,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewMode::List => "Tasks",
            ViewMode::Calendar => "Week",
        }
    }
}

impl From<Variant> for ViewMode {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::List => ViewMode::List,
            Variant::Calendar => ViewMode::Calendar,
        }
    }
}
