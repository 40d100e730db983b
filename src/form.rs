//! New-task form controller.
//!
//! The form is either `Closed` or `Open`. While open it stages a [`TaskDraft`]
//! field by field; `submit` validates and commits into the repository, leaving the
//! form open with field messages when validation fails.

use log::debug;

use crate::db::KeyValueStore;
use crate::errors::{Result, TaskError};
use crate::fields::*;
use crate::repository::TaskRepository;
use crate::task::{FieldErrors, FormField, Task, TaskDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Closed,
    Open,
}

/// A single field edit.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Title(String),
    Description(String),
    Category(Option<Category>),
    Priority(Priority),
    Day(Day),
    Time(String),
}

impl FieldChange {
    pub fn field(&self) -> FormField {
        match self {
            FieldChange::Title(_) => FormField::Title,
            FieldChange::Description(_) => FormField::Description,
            FieldChange::Category(_) => FormField::Category,
            FieldChange::Priority(_) => FormField::Priority,
            FieldChange::Day(_) => FormField::Day,
            FieldChange::Time(_) => FormField::Time,
        }
    }
}

/// Staged draft plus validation state for the add-task form.
#[derive(Debug, Clone)]
pub struct TaskForm {
    state: FormState,
    draft: TaskDraft,
    errors: FieldErrors,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    pub fn new() -> Self {
        Self {
            state: FormState::Closed,
            draft: TaskDraft::default(),
            errors: FieldErrors::new(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == FormState::Open
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn open(&mut self) {
        self.state = FormState::Open;
    }

    /// Close without committing. The draft is kept for the next time the form opens.
    pub fn cancel(&mut self) {
        self.state = FormState::Closed;
    }

    /// Apply one field edit and clear that field's error.
    pub fn update(&mut self, change: FieldChange) {
        if !self.is_open() {
            debug!("Ignoring {:?} edit on a closed form", change.field());
            return;
        }
        self.errors.clear(change.field());
        match change {
            FieldChange::Title(v) => self.draft.title = v,
            FieldChange::Description(v) => self.draft.description = v,
            FieldChange::Category(v) => self.draft.category = v,
            FieldChange::Priority(v) => self.draft.priority = v,
            FieldChange::Day(v) => self.draft.day = v,
            FieldChange::Time(v) => self.draft.time = v,
        }
    }

    /// Validate and commit the draft.
    ///
    /// Returns `Ok(None)` when validation failed (messages are in
    /// [`errors`](Self::errors)) or the form was not open. Storage failures are
    /// returned as errors and keep the form open.
    pub fn submit<S: KeyValueStore>(&mut self, repo: &mut TaskRepository<S>) -> Result<Option<Task>> {
        if !self.is_open() {
            return Ok(None);
        }
        if let Err(errors) = self.draft.validate() {
            debug!("Draft rejected: {}", errors);
            self.errors = errors;
            return Ok(None);
        }
        match repo.create(&self.draft) {
            Ok(task) => {
                self.draft = TaskDraft::default();
                self.errors.clear_all();
                self.state = FormState::Closed;
                Ok(Some(task))
            }
            Err(TaskError::Validation { errors }) => {
                self.errors = errors;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
