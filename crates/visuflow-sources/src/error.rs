//! Error types for visuflow-sources

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// Input text is not valid JSON.
    #[error("invalid JSON at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("invalid GitHub repository URL: {0:?}")]
    InvalidRepoUrl(String),

    /// GitHub answered with a non-success status.
    #[error("GitHub request to {url} failed with status {status}")]
    Http { status: u16, url: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("no such table: {0}")]
    UnknownTable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SourceError {
    /// True when the caller supplied something unusable, as opposed to an
    /// upstream or local failure. A file that is not a database and a query
    /// that does not prepare both land here.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            SourceError::Parse { .. }
                | SourceError::InvalidRepoUrl(_)
                | SourceError::UnknownTable(_)
                | SourceError::Sqlite(_)
        )
    }

    /// True when a remote service failed or was unreachable.
    pub fn is_upstream(&self) -> bool {
        matches!(self, SourceError::Http { .. } | SourceError::Request(_))
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SourceError>;
