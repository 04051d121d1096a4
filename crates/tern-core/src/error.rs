//! Core error types.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that abort the current turn.
///
/// Tool failures never appear here: they are recovered locally and fed
/// back to the model as failed tool outcomes.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The model exchange failed at the transport or API level.
    #[error(transparent)]
    Provider(#[from] tern_provider::ProviderError),

    /// The tool-use loop exceeded the configured round cap.
    #[error("Tool-use loop exceeded {0} rounds")]
    RoundLimit(u32),

    /// The turn was cancelled.
    #[error("Cancelled")]
    Cancelled,
}
