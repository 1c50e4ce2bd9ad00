//! vizaskctl configuration
//!
//! Lives in `<config_dir>/vizask/config.toml` unless `--config` or
//! `$VIZASK_CONFIG` point elsewhere. A missing file means defaults; a file
//! that exists but does not parse is an error.
//!
//! Precedence, lowest first: file, `$VIZASK_ENDPOINT` / `$VIZASK_VIEW`,
//! command-line flags.

use crate::controller::{ControllerSettings, DEFAULT_VIEW_NAME};
use crate::gateway::DEFAULT_ENDPOINT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use vizask_shared::DEFAULT_EXCLUDED_FILTERS;

const CONFIG_DIR: &str = "vizask";
const CONFIG_FILE: &str = "config.toml";

pub const ENV_CONFIG: &str = "VIZASK_CONFIG";
pub const ENV_ENDPOINT: &str = "VIZASK_ENDPOINT";
pub const ENV_VIEW: &str = "VIZASK_VIEW";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Backend section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// URL the request body is POSTed to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

/// Dashboard section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Data view whose filters and data are read
    #[serde(default = "default_view_name")]
    pub view_name: String,

    /// Filter names never sent to the backend
    #[serde(default = "default_excluded_filters")]
    pub excluded_filters: Vec<String>,
}

fn default_view_name() -> String {
    DEFAULT_VIEW_NAME.to_string()
}

fn default_excluded_filters() -> Vec<String> {
    DEFAULT_EXCLUDED_FILTERS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            view_name: default_view_name(),
            excluded_filters: default_excluded_filters(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VizaskConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl VizaskConfig {
    /// Default config file location, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Pick the config file: explicit path, then `$VIZASK_CONFIG`, then the
    /// default location.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from))
            .or_else(Self::default_path)
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Locate and load, then apply environment overrides.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match Self::locate(explicit) {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`, which maps an env var name to its value.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.is_empty()) {
            self.backend.endpoint = endpoint;
        }
        if let Some(view) = lookup(ENV_VIEW).filter(|v| !v.is_empty()) {
            self.dashboard.view_name = view;
        }
    }

    /// Apply command-line overrides.
    pub fn apply_flags(&mut self, endpoint: Option<String>, view: Option<String>) {
        if let Some(endpoint) = endpoint {
            self.backend.endpoint = endpoint;
        }
        if let Some(view) = view {
            self.dashboard.view_name = view;
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            view_name: self.dashboard.view_name.clone(),
            excluded_filters: self.dashboard.excluded_filters.clone(),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
