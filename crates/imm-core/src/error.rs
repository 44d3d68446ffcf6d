/// Core error types for the IMM export builder.
use std::path::PathBuf;

/// A specialized Result type for IMM operations.
pub type ImmResult<T> = Result<T, ImmError>;

/// Top-level error type encompassing every stage of an export build.
#[derive(Debug, thiserror::Error)]
pub enum ImmError {
    #[error("creation failed: {0}")]
    Creation(String),

    #[error("initialization failed: {0}")]
    Initialization(String),

    #[error("out of order: {0}")]
    Ordering(String),

    #[error("{what} index {index} out of range (capacity {capacity})")]
    IndexOutOfRange {
        what: &'static str,
        index: u32,
        capacity: u32,
    },

    #[error("stale handle: {0}")]
    StaleHandle(String),

    #[error("budget exceeded: {resource} needs {required}, ceiling is {ceiling}")]
    BudgetExceeded {
        resource: &'static str,
        required: i64,
        ceiling: i64,
    },

    #[error("export error: {message} ({path:?})")]
    Export { message: String, path: PathBuf },

    #[error("container error: {0}")]
    Container(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ImmError {
    /// Create an export error tied to a destination path.
    pub fn export(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ImmError::Export {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create an out-of-range error for a fixed-capacity slot list.
    pub fn out_of_range(what: &'static str, index: u32, capacity: u32) -> Self {
        ImmError::IndexOutOfRange {
            what,
            index,
            capacity,
        }
    }
}
