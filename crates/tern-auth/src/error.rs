//! Error types for credential operations.

use thiserror::Error;

/// Errors that can occur during credential operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Failed to read or write a credential file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a token response.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No credential could be resolved from any source.
    #[error("No credential found (set ANTHROPIC_API_KEY or run `tern auth login`)")]
    NoCredential,

    /// Could not determine the config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// Failed to set file permissions.
    #[error("Failed to set file permissions: {0}")]
    Permissions(String),

    /// The authorization flow failed.
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// The callback state did not match (possible CSRF).
    #[error("Authorization state mismatch")]
    StateMismatch,

    /// Token exchange request failed.
    #[error("Token exchange failed: {0}")]
    TokenExchange(#[from] reqwest::Error),
}

/// Result type for credential operations.
pub type AuthResult<T> = Result<T, AuthError>;
