//! Error type for loading, writing and logging schedule items.

/// Errors that can occur while managing schedule items.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// JSON encode/decode error (fire log).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item validation error (e.g. empty id, invalid recurrence).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Filesystem watcher error.
    #[error("Notify watcher error: {0}")]
    Watcher(#[from] notify::Error),
}

/// Result alias for schedule operations.
pub type Result<T> = std::result::Result<T, ScheduleError>;
