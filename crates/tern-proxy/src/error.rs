//! Proxy error types.

use thiserror::Error;

/// Result type for proxy operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Errors that can occur while fulfilling a proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The external agent could not be spawned.
    #[error("Failed to spawn agent: {0}")]
    Spawn(String),

    /// The external agent did not finish within the timeout.
    #[error("Agent timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The external agent exited with an error and produced no output.
    #[error("Agent failed: {0}")]
    AgentFailed(String),

    /// The request envelope held no usable user message.
    #[error("No user message in request")]
    NoUserMessage,

    /// No credential could be resolved for the downstream agent.
    #[error("No credential available: {0}")]
    NoCredential(#[from] tern_auth::AuthError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
