//! Logging for vizaskctl
//!
//! Diagnostics go through `tracing` to stderr. Each finished cycle is also
//! appended as one JSON line to the cycle log.

use crate::controller::CycleReport;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub const ENV_LOG: &str = "VIZASK_LOG";
pub const ENV_LOG_FILE: &str = "VIZASK_LOG_FILE";

/// Install the stderr subscriber. The filter comes from `$VIZASK_LOG`, then
/// `$RUST_LOG`, then `warn`; `verbose` forces `debug`.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(ENV_LOG)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// One line of the cycle log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleLogEntry {
    /// RFC 3339 timestamp
    pub ts: String,

    pub cycle_id: String,

    /// Mode label, e.g. "AI Assistant"
    pub mode: String,

    pub ok: bool,

    pub duration_ms: u64,

    pub filter_count: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl CycleLogEntry {
    pub fn from_report(report: &CycleReport) -> Self {
        Self {
            ts: chrono::Utc::now().to_rfc3339(),
            cycle_id: report.cycle_id.to_string(),
            mode: report.mode.label().to_string(),
            ok: report.is_success(),
            duration_ms: report.duration.as_millis() as u64,
            filter_count: report.filter_count,
            error: report.error().map(|e| ErrorDetails {
                code: e.code().to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Log file location
    ///
    /// Priority:
    /// 1. $VIZASK_LOG_FILE
    /// 2. $XDG_STATE_HOME/vizask/cycles.jsonl
    /// 3. ~/.local/state/vizask/cycles.jsonl
    pub fn discover_log_path() -> Option<PathBuf> {
        Self::discover_log_path_with(|key| std::env::var(key).ok())
    }

    pub fn discover_log_path_with<F>(lookup: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_LOG_FILE) {
            return Some(PathBuf::from(path));
        }
        if let Some(state) = lookup("XDG_STATE_HOME") {
            return Some(Path::new(&state).join("vizask").join("cycles.jsonl"));
        }
        lookup("HOME").map(|home| {
            Path::new(&home)
                .join(".local/state")
                .join("vizask")
                .join("cycles.jsonl")
        })
    }

    /// Append to the discovered log file. Failures are only logged.
    pub fn write(&self) {
        let Some(path) = Self::discover_log_path() else {
            debug!("no cycle log location available");
            return;
        };
        if let Err(e) = self.append_to(&path) {
            debug!(path = %path.display(), "cycle log write failed: {}", e);
        }
    }

    pub fn append_to(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}
