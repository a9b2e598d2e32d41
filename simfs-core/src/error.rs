//! Error types for the file system simulator.

use thiserror::Error;

/// Errors that can occur while running simulator commands.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("No user logged in. Please login first.")]
    NotLoggedIn,

    #[error("User '{0}' is already logged in. Logout first.")]
    AlreadyLoggedIn(String),

    #[error("File or directory '{0}' already exists")]
    DuplicateName(String),

    #[error("User '{0}' already exists")]
    DuplicateUsername(String),

    #[error("'{0}' not found")]
    NotFound(String),

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("'{0}' is not a directory")]
    NotADirectory(String),

    #[error("'{0}' is a directory, not a file")]
    NotAFile(String),

    #[error("Directory '{0}' is not empty")]
    NotEmpty(String),

    #[error("Cannot move '{source_path}' into itself ('{destination}')")]
    CyclicMove {
        source_path: String,
        destination: String,
    },

    #[error("Invalid name: '{0}'")]
    InvalidName(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error("Unknown command: {0}. Type 'help' for available commands.")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotLoggedIn => "SIMFS_NOT_LOGGED_IN",
            Self::AlreadyLoggedIn(_) => "SIMFS_ALREADY_LOGGED_IN",
            Self::DuplicateName(_) => "SIMFS_DUPLICATE_NAME",
            Self::DuplicateUsername(_) => "SIMFS_DUPLICATE_USERNAME",
            Self::NotFound(_) => "SIMFS_NOT_FOUND",
            Self::UserNotFound(_) => "SIMFS_USER_NOT_FOUND",
            Self::NotADirectory(_) => "SIMFS_NOT_DIRECTORY",
            Self::NotAFile(_) => "SIMFS_NOT_FILE",
            Self::NotEmpty(_) => "SIMFS_NOT_EMPTY",
            Self::CyclicMove { .. } => "SIMFS_CYCLIC_MOVE",
            Self::InvalidName(_) => "SIMFS_INVALID_NAME",
            Self::InvalidOperation(_) => "SIMFS_INVALID_OPERATION",
            Self::UnknownCommand(_) => "SIMFS_UNKNOWN_COMMAND",
            Self::Usage(_) => "SIMFS_USAGE",
            Self::Io(_) => "SIMFS_IO_ERROR",
            Self::Json(_) => "SIMFS_JSON_ERROR",
        }
    }

    /// JSON object describing the error, used by the shell's JSON output mode.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        })
    }
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
