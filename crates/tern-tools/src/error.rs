//! Tool error types.

use thiserror::Error;

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors that can occur during tool execution.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Invalid parameters.
    #[error("Validation error: {0}")]
    Validation(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Path is a directory where a file was expected.
    #[error("Path is a directory: {0}")]
    IsDirectory(String),

    /// Edit target string not found in the file.
    #[error("String not found in file")]
    NoMatch,

    /// Edit target string occurs more than once.
    #[error("String found {count} times - must be unique")]
    AmbiguousMatch { count: usize },

    /// Search pattern does not compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Operation timed out.
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Operation was cancelled.
    #[error("Cancelled")]
    Cancelled,

    /// Execution failed.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound(path.into())
    }

    /// Create an execution failed error.
    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::ExecutionFailed(message.into())
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(message: impl Into<String>) -> Self {
        Self::InvalidPattern(message.into())
    }
}
