//! Application configuration.
//!
//! Settings live in `config.json` inside the data directory. Every field has a
//! default, so a missing file or a partial file is fine; a file that is not valid
//! JSON is reported as a configuration error.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TaskError};
use crate::fields::{SortKey, Variant};
use crate::view::{CategoryFilter, ViewOptions};

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Application configuration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which presentation new tasks are created for.
    pub variant: Variant,

    /// Sort key the list starts with.
    pub default_sort: SortKey,

    /// Whether completed tasks are visible on start.
    pub show_completed: bool,

    /// Show the splash banner when the UI starts.
    pub welcome_banner: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: Variant::List,
            default_sort: SortKey::Newest,
            show_completed: true,
            welcome_banner: true,
        }
    }
}

impl Config {
    /// Load `config.json` from `data_dir`, or the defaults if it does not exist.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)?;
        serde_json::from_str(&raw).map_err(|e| TaskError::Config {
            message: format!("{}: {}", path.display(), e),
        })
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;
        let data = serde_json::to_string_pretty(self)?;
        fs::write(data_dir.join(CONFIG_FILE), data)?;
        Ok(())
    }

    /// Projection settings the views start from.
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            show_completed: self.show_completed,
            category_filter: CategoryFilter::All,
            sort: self.default_sort,
        }
    }
}

/// `$HOME/.colortask`, or `./.colortask` when `HOME` is unset.
pub fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".colortask")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"variant":"calendar","default_sort":"priority"}"#,
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.variant, Variant::Calendar);
        assert_eq!(config.default_sort, SortKey::Priority);
        assert!(config.show_completed);
        assert_eq!(config.view_options().sort, SortKey::Priority);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "variant = calendar").unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(TaskError::Config { .. })
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            show_completed: false,
            welcome_banner: false,
            ..Config::default()
        };
        config.save(dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), config);
    }
}
