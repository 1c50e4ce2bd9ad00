//! Error types for vizask.

use thiserror::Error;

/// Failures reported by the dashboard host.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Data view not found: {0}")]
    ViewNotFound(String),

    #[error("Dashboard host error: {0}")]
    Unavailable(String),
}

impl HostError {
    pub fn code(&self) -> &'static str {
        match self {
            HostError::ViewNotFound(_) => "view_not_found",
            HostError::Unavailable(_) => "host_unavailable",
        }
    }
}

/// Failures while assembling the outbound request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Please enter a question before sending")]
    EmptyQuestion,
}

impl BuildError {
    pub fn code(&self) -> &'static str {
        match self {
            BuildError::EmptyQuestion => "empty_question",
        }
    }
}

/// Failures loading a dashboard fixture file.
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
