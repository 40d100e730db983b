//! Key-value storage and the persistent task store.
//!
//! Everything ColorTask remembers lives in a small synchronous key-value store:
//! the task list as one JSON array under [`TASKS_KEY`] and the dark-mode flag under
//! [`DARK_MODE_KEY`]. [`FileStore`] keeps one `<key>.json` file per slot inside
//! the data directory; [`MemoryStore`] is the same contract without the disk.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, SubsecRound, Utc};
use log::{debug, error, info, trace};

use crate::errors::Result;
use crate::fields::*;
use crate::task::Task;

/// Storage slot holding the serialized task list.
pub const TASKS_KEY: &str = "colorTasks";
/// Storage slot holding the dark-mode preference.
pub const DARK_MODE_KEY: &str = "darkMode";

/// Synchronous string key-value storage.
pub trait KeyValueStore {
    /// Read a slot. `Ok(None)` means the slot has never been written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a slot with `value`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Key-value store backed by one file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            debug!("Creating data directory: {}", dir.display());
            fs::create_dir_all(dir)?;
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    #[cfg(test)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            trace!("Slot {} not present at {}", key, path.display());
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // Atomic-ish write via temp + rename.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        f.write_all(value.as_bytes())?;
        f.flush()?;
        fs::rename(&tmp, &path)?;
        trace!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// In-memory key-value store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Memory store whose writes fail while the shared switch is on.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    pub failing: std::rc::Rc<std::cell::Cell<bool>>,
}

#[cfg(test)]
impl FlakyStore {
    /// A store holding an empty task list.
    pub fn empty() -> Self {
        let mut store = Self::default();
        store.inner.slots.insert(TASKS_KEY.to_string(), "[]".to_string());
        store
    }
}

#[cfg(test)]
impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.failing.get() {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
        }
        self.inner.set(key, value)
    }
}

/// Loads and saves the whole task collection through a [`KeyValueStore`].
#[derive(Debug)]
pub struct TaskStore<S> {
    kv: S,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Read the stored task list.
    ///
    /// Returns `None` when nothing has ever been saved (first run). A slot that
    /// exists but cannot be read or parsed is logged and treated as an empty list.
    pub fn load(&self) -> Option<Vec<Task>> {
        let raw = match self.kv.get(TASKS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("No saved tasks found, first run");
                return None;
            }
            Err(e) => {
                error!("Error reading saved tasks, starting fresh: {}", e);
                return Some(Vec::new());
            }
        };
        match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => {
                debug!("Loaded {} tasks", tasks.len());
                Some(tasks)
            }
            Err(e) => {
                error!("Error parsing saved tasks, starting fresh: {}", e);
                Some(Vec::new())
            }
        }
    }

    /// Serialize the full collection and overwrite the task slot.
    pub fn save(&mut self, tasks: &[Task]) -> Result<()> {
        let data = serde_json::to_string_pretty(tasks)?;
        self.kv.set(TASKS_KEY, &data)?;
        debug!("Saved {} tasks", tasks.len());
        Ok(())
    }

    /// Dark mode is on only when the slot holds exactly `true`.
    pub fn load_dark_mode(&self) -> bool {
        match self.kv.get(DARK_MODE_KEY) {
            Ok(Some(raw)) => raw.trim() == "true",
            Ok(None) => false,
            Err(e) => {
                error!("Error reading dark mode preference: {}", e);
                false
            }
        }
    }

    pub fn save_dark_mode(&mut self, dark: bool) -> Result<()> {
        self.kv.set(DARK_MODE_KEY, if dark { "true" } else { "false" })
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }
}

/// Example tasks written on first run.
///
/// The calendar variant gets the same three tasks pinned to today's column.
pub fn seed_tasks(variant: Variant, now: DateTime<Utc>) -> Vec<Task> {
    let now = now.trunc_subsecs(3);
    let mut tasks = vec![
        Task {
            id: "1".into(),
            title: "Create project wireframes".into(),
            description: String::new(),
            category: Category::Work.into(),
            priority: Priority::High,
            completed: false,
            created_at: now,
            day: None,
            time: None,
            color: None,
        },
        Task {
            id: "2".into(),
            title: "Go for a 30-minute walk".into(),
            description: String::new(),
            category: Category::Health.into(),
            priority: Priority::Medium,
            completed: false,
            created_at: now - Duration::days(1),
            day: None,
            time: None,
            color: None,
        },
        Task {
            id: "3".into(),
            title: "Read chapter 5 of design book".into(),
            description: String::new(),
            category: Category::Learning.into(),
            priority: Priority::Low,
            completed: true,
            created_at: now - Duration::days(2),
            day: None,
            time: None,
            color: None,
        },
    ];

    if variant == Variant::Calendar {
        let today = Day::today();
        let placements = [
            ("10:00 AM", NoteColor::Yellow),
            ("6:00 PM", NoteColor::Green),
            ("8:00 PM", NoteColor::Blue),
        ];
        for (task, (time, color)) in tasks.iter_mut().zip(placements) {
            task.day = Some(today);
            task.time = Some(time.to_string());
            task.color = Some(color);
        }
    }

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_absent_slot_is_first_run() {
        let store = TaskStore::new(MemoryStore::new());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_corrupt_slot_loads_empty() {
        let mut kv = MemoryStore::new();
        kv.set(TASKS_KEY, "{ not json").unwrap();
        let store = TaskStore::new(kv);
        assert_eq!(store.load(), Some(Vec::new()));
    }

    #[test]
    fn test_save_load_save_is_byte_identical() {
        let mut store = TaskStore::new(MemoryStore::new());
        let seeds = seed_tasks(Variant::Calendar, Utc::now());
        store.save(&seeds).unwrap();
        let first = store.kv().get(TASKS_KEY).unwrap().unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, seeds);
        store.save(&loaded).unwrap();
        let second = store.kv().get(TASKS_KEY).unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_seed_tasks() {
        let now = Utc::now();
        let seeds = seed_tasks(Variant::List, now);
        let titles: Vec<&str> = seeds.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Create project wireframes",
                "Go for a 30-minute walk",
                "Read chapter 5 of design book"
            ]
        );
        assert!(seeds[2].completed);
        assert!(seeds.iter().all(|t| t.day.is_none() && t.color.is_none()));

        let calendar = seed_tasks(Variant::Calendar, now);
        assert!(calendar.iter().all(|t| t.day == Some(Day::today())));
        assert!(calendar
            .iter()
            .all(|t| slot_index(t.time.as_deref().unwrap_or("")).is_some()));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut kv = FileStore::open(&dir.path().join("data")).unwrap();
        assert_eq!(kv.get(TASKS_KEY).unwrap(), None);
        kv.set(TASKS_KEY, "[]").unwrap();
        assert_eq!(kv.get(TASKS_KEY).unwrap().as_deref(), Some("[]"));
        assert!(kv.dir().join("colorTasks.json").exists());
        assert!(!kv.dir().join("colorTasks.json.tmp").exists());
    }

    #[test]
    fn test_dark_mode_preference() {
        let mut store = TaskStore::new(MemoryStore::new());
        assert!(!store.load_dark_mode());
        store.save_dark_mode(true).unwrap();
        assert!(store.load_dark_mode());
        assert_eq!(store.kv().get(DARK_MODE_KEY).unwrap().as_deref(), Some("true"));
        store.save_dark_mode(false).unwrap();
        assert!(!store.load_dark_mode());
    }
}
