//! Shell configuration
//!
//! The page set is fixed for the life of the process and comes from a JSON
//! file (`ALL_IN_POSTER_CONFIG`, or `<config dir>/all-in-poster/pages.json`).
//! A missing file means the built-in defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::backend::WindowSize;
use crate::controller::ControllerSettings;
use crate::pages::{Page, PageMode};

pub const CONFIG_ENV: &str = "ALL_IN_POSTER_CONFIG";

const APP_DIR: &str = "all-in-poster";
const CONFIG_FILE: &str = "pages.json";
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    pub id: String,
    pub title: String,
    pub url: String,
    pub mode: PageMode,
}

impl PageSpec {
    fn new(id: &str, title: &str, url: &str, mode: PageMode) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            mode,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ShellConfig {
    pub pages: Vec<PageSpec>,
    /// Size of newly created page windows
    pub window: WindowSize,
    /// Deadline for a single create/close/focus command
    pub command_timeout_secs: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            pages: vec![
                PageSpec::new("x", "X (Twitter)", "https://x.com", PageMode::External),
                PageSpec::new("telegram", "Telegram", "https://web.telegram.org", PageMode::External),
                PageSpec::new("example", "Example", "https://example.com", PageMode::Embedded),
                PageSpec::new("google", "Google", "https://google.com", PageMode::Embedded),
            ],
            window: WindowSize::default(),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
        }
    }
}

impl ShellConfig {
    /// Load `.env`, then the config file it points at.
    pub fn load() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_filename("../.env");
        }
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(target: "config", path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        tracing::info!(
            target: "config",
            path = %path.display(),
            pages = config.pages.len(),
            "config loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for spec in &self.pages {
            // ids end up in host window labels
            let valid_id = !spec.id.is_empty()
                && spec
                    .id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !valid_id {
                return Err(ConfigError::Invalid(format!("bad page id '{}'", spec.id)));
            }
            if !seen.insert(spec.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate page id '{}'", spec.id)));
            }
            if !(spec.url.starts_with("https://") || spec.url.starts_with("http://")) {
                return Err(ConfigError::Invalid(format!(
                    "page '{}' has unsupported url '{}'",
                    spec.id, spec.url
                )));
            }
        }

        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(ConfigError::Invalid("window size must be positive".into()));
        }
        if self.command_timeout_secs == 0 {
            return Err(ConfigError::Invalid("commandTimeoutSecs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn pages(&self) -> Vec<Page> {
        self.pages
            .iter()
            .map(|spec| Page::new(&spec.id, &spec.title, &spec.url, spec.mode))
            .collect()
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            window: self.window,
            command_timeout: Duration::from_secs(self.command_timeout_secs),
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}
