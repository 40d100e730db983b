//! Task data structure, new-task drafts and draft validation.
//!
//! `Task` is the only persisted entity. It serializes with camelCase keys and
//! millisecond ISO-8601 timestamps so the stored JSON array keeps one stable shape.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A user-created to-do record.
///
/// The calendar fields are only set for tasks created by the calendar variant and
/// are left out of the JSON entirely otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: TaskCategory,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<Day>,
    /// Usually one of [`TIME_SLOTS`]; any other string is kept as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<NoteColor>,
}

/// Form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Title,
    Description,
    Category,
    Priority,
    Day,
    Time,
}

impl FormField {
    pub fn name(self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Description => "description",
            FormField::Category => "category",
            FormField::Priority => "priority",
            FormField::Day => "day",
            FormField::Time => "time",
        }
    }
}

/// Field → message mapping produced by draft validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Clear the message for one field, leaving the others in place.
    pub fn clear(&mut self, field: FormField) {
        self.0.remove(&field);
    }

    pub fn clear_all(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, msg)| format!("{}: {}", field.name(), msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// The in-progress state of a new task before it is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub priority: Priority,
    pub day: Day,
    pub time: String,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: None,
            priority: Priority::default(),
            day: Day::today(),
            time: DEFAULT_TIME_SLOT.to_string(),
        }
    }
}

impl TaskDraft {
    /// Draft with a title and category and every other field at its default.
    pub fn new(title: &str, category: Category) -> Self {
        Self {
            title: title.to_string(),
            category: Some(category),
            ..Self::default()
        }
    }

    /// Check the required fields. Title must be non-empty after trimming and a
    /// category must be chosen.
    pub fn validate(&self) -> std::result::Result<Category, FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.title.trim().is_empty() {
            errors.insert(FormField::Title, "Title is required");
        }
        match self.category {
            Some(category) if errors.is_empty() => Ok(category),
            Some(_) => Err(errors),
            None => {
                errors.insert(FormField::Category, "Category is required");
                Err(errors)
            }
        }
    }
}

/// Millisecond-precision RFC 3339 timestamps with a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task() -> Task {
        Task {
            id: "1700000000000".into(),
            title: "Buy milk".into(),
            description: String::new(),
            category: Category::Errands.into(),
            priority: Priority::Medium,
            completed: false,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
            day: None,
            time: None,
            color: None,
        }
    }

    #[test]
    fn test_serializes_with_camel_case_and_millis() {
        let json = serde_json::to_string(&sample_task()).unwrap();
        assert!(json.contains("\"createdAt\":\"2024-03-01T09:30:00.000Z\""));
        assert!(json.contains("\"category\":\"errands\""));
        assert!(json.contains("\"priority\":\"medium\""));
        assert!(!json.contains("\"day\""));
        assert!(!json.contains("\"color\""));
    }

    #[test]
    fn test_deserializes_record_without_optional_fields() {
        let raw = r#"{"id":"2","title":"Go for a 30-minute walk","completed":false,
            "category":"health","priority":"medium","createdAt":"2024-02-29T12:00:00.123Z"}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.category, Category::Health);
        assert_eq!(task.description, "");
        assert_eq!(task.day, None);
        assert_eq!(task.created_at.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_calendar_fields_round_trip() {
        let mut task = sample_task();
        task.day = Some(Day::Friday);
        task.time = Some("11:45 AM".into());
        task.color = Some(NoteColor::Pink);
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"day\":\"Friday\""));
        assert!(json.contains("\"color\":\"pink\""));
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_unknown_category_survives_round_trip() {
        let raw = r#"{"id":"9","title":"x","category":"gardening","createdAt":"2024-02-29T12:00:00.000Z"}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.category, TaskCategory::Unknown("gardening".into()));
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"category\":\"gardening\""));
    }

    #[test]
    fn test_validate_requires_title_and_category() {
        let draft = TaskDraft {
            title: "   ".into(),
            ..TaskDraft::default()
        };
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.get(FormField::Title), Some("Title is required"));
        assert_eq!(errors.get(FormField::Category), Some("Category is required"));
        assert_eq!(errors.len(), 2);

        let ok = TaskDraft::new("Read", Category::Learning);
        assert_eq!(ok.validate(), Ok(Category::Learning));
    }

    #[test]
    fn test_field_errors_display_and_clear() {
        let mut errors = FieldErrors::new();
        errors.insert(FormField::Category, "Category is required");
        errors.insert(FormField::Title, "Title is required");
        assert_eq!(
            errors.to_string(),
            "title: Title is required; category: Category is required"
        );
        errors.clear(FormField::Title);
        assert_eq!(errors.get(FormField::Title), None);
        assert_eq!(errors.get(FormField::Category), Some("Category is required"));
    }
}
