//! The task repository: the single owner of the in-memory task collection.
//!
//! Every mutating method writes the full collection back through the
//! [`TaskStore`] before returning and queues a [`Notification`] for the front end
//! to surface. A failed write undoes the in-memory change, so memory never holds
//! a task state that was not saved. Lookups of unknown ids are silent no-ops.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use log::{debug, info, warn};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::db::{seed_tasks, KeyValueStore, TaskStore};
use crate::errors::{Result, TaskError};
use crate::fields::*;
use crate::task::{Task, TaskDraft};

/// Chooses the sticky-note color for a new calendar task.
pub trait ColorPicker {
    fn pick(&mut self) -> NoteColor;
}

/// Uniform random choice over [`NoteColor::ALL`].
pub struct RandomColorPicker {
    rng: StdRng,
}

impl RandomColorPicker {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence of colors for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomColorPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorPicker for RandomColorPicker {
    fn pick(&mut self) -> NoteColor {
        *NoteColor::ALL
            .choose(&mut self.rng)
            .unwrap_or(&NoteColor::Yellow)
    }
}

/// Always returns the same color.
pub struct FixedColorPicker(pub NoteColor);

impl ColorPicker for FixedColorPicker {
    fn pick(&mut self) -> NoteColor {
        self.0
    }
}

/// A fire-and-forget success message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
}

impl Notification {
    pub fn success(message: String) -> Self {
        Self { message }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Aggregate completion numbers over the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    /// Rounded completion percentage, 0 for an empty collection.
    pub percentage: u32,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let percentage = if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        Self {
            total,
            completed,
            percentage,
        }
    }
}

/// In-memory authoritative task collection plus its mutations.
pub struct TaskRepository<S> {
    store: TaskStore<S>,
    tasks: Vec<Task>,
    variant: Variant,
    picker: Box<dyn ColorPicker>,
    notifications: Vec<Notification>,
}

impl<S: KeyValueStore> TaskRepository<S> {
    /// Hydrate from the store, or seed and persist the example tasks on first run.
    pub fn open(store: TaskStore<S>, variant: Variant, picker: Box<dyn ColorPicker>) -> Result<Self> {
        let mut repo = Self {
            store,
            tasks: Vec::new(),
            variant,
            picker,
            notifications: Vec::new(),
        };
        match repo.store.load() {
            Some(tasks) => repo.tasks = tasks,
            None => {
                info!("Seeding example tasks");
                repo.tasks = seed_tasks(variant, Utc::now());
                repo.persist()?;
            }
        }
        Ok(repo)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TaskStore<S> {
        &mut self.store
    }

    /// Validate a draft and prepend the resulting task.
    pub fn create(&mut self, draft: &TaskDraft) -> Result<Task> {
        self.create_at(draft, Utc::now())
    }

    /// [`create`](Self::create) with an explicit creation time.
    pub fn create_at(&mut self, draft: &TaskDraft, now: DateTime<Utc>) -> Result<Task> {
        let category = draft
            .validate()
            .map_err(|errors| TaskError::Validation { errors })?;
        let now = now.trunc_subsecs(3);

        let (day, time, color) = match self.variant {
            Variant::List => (None, None, None),
            Variant::Calendar => (
                Some(draft.day),
                Some(draft.time.clone()),
                Some(self.picker.pick()),
            ),
        };

        let task = Task {
            id: self.next_id(now),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            category: category.into(),
            priority: draft.priority,
            completed: false,
            created_at: now,
            day,
            time,
            color,
        };

        self.tasks.insert(0, task.clone());
        if let Err(e) = self.persist() {
            warn!("Save failed, dropping new task {}: {}", task.id, e);
            self.tasks.remove(0);
            return Err(e);
        }
        info!("Added task {}", task.id);
        self.notifications
            .push(Notification::success(format!("Added: {}", task.title)));
        Ok(task)
    }

    /// Flip the completion flag of a task. Unknown ids are ignored.
    pub fn toggle_completion(&mut self, id: &str) -> Result<()> {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            debug!("Toggle ignored, no task with id {}", id);
            return Ok(());
        };
        self.tasks[idx].completed = !self.tasks[idx].completed;

        if let Err(e) = self.persist() {
            warn!("Save failed, reverting toggle of {}: {}", id, e);
            self.tasks[idx].completed = !self.tasks[idx].completed;
            return Err(e);
        }
        let task = &self.tasks[idx];
        if task.completed {
            let message = format!("Completed: {}", task.title);
            self.notifications.push(Notification::success(message));
        }
        Ok(())
    }

    /// Remove a task. Unknown ids are ignored.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            debug!("Delete ignored, no task with id {}", id);
            return Ok(());
        };
        let removed = self.tasks.remove(idx);

        if let Err(e) = self.persist() {
            warn!("Save failed, restoring task {}: {}", removed.id, e);
            self.tasks.insert(idx, removed);
            return Err(e);
        }
        info!("Deleted task {}", removed.id);
        self.notifications
            .push(Notification::success(format!("Deleted: {}", removed.title)));
        Ok(())
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    /// Drain queued notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Write the whole collection back to storage.
    fn persist(&mut self) -> Result<()> {
        self.store.save(&self.tasks)
    }

    /// Millisecond timestamp id, bumped until it is unused.
    fn next_id(&self, now: DateTime<Utc>) -> String {
        let mut candidate = now.timestamp_millis();
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }
}
