use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use sitework_util::errors::SiteworkError;

/// Global user configuration loaded from `~/.sitework/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub cascade: CascadeConfig,

    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Cascade walk settings from `[cascade]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Abort a cascade after visiting this many units.
    #[serde(default = "default_max_visits", rename = "max-visits")]
    pub max_visits: usize,
    /// Move a phase's tasks along with the phase.
    #[serde(default = "default_true", rename = "shift-child-tasks")]
    pub shift_child_tasks: bool,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            max_visits: default_max_visits(),
            shift_child_tasks: true,
        }
    }
}

fn default_max_visits() -> usize {
    500
}

fn default_true() -> bool {
    true
}

/// Change notification settings from `[notify]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_true", rename = "log-events")]
    pub log_events: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self { log_events: true }
    }
}

impl GlobalConfig {
    /// Load the global configuration from `~/.sitework/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> Result<Self, SiteworkError> {
        Self::load_from(&Self::default_path())
    }

    /// Load from an explicit path, returning defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, SiteworkError> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| SiteworkError::Config {
            message: format!("Failed to read global config: {e}"),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| SiteworkError::Config {
            message: format!("Failed to parse global config: {e}"),
        })?;
        if config.cascade.max_visits == 0 {
            return Err(SiteworkError::Config {
                message: "cascade.max-visits must be at least 1".to_string(),
            });
        }
        Ok(config)
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the Sitework data directory.
///
/// `SITEWORK_HOME` wins when set; otherwise `~/.sitework/`.
pub fn dirs_path() -> PathBuf {
    if let Ok(dir) = std::env::var("SITEWORK_HOME") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".sitework")
}
