//! Credential storage and OAuth support for tern.
//!
//! # Credential kinds
//!
//! - **API key**: direct API access, sent as `x-api-key`
//! - **OAuth token**: bearer token obtained through the interactive
//!   authorization-code + PKCE flow
//!
//! # Resolution order
//!
//! Environment variable, then the user-level key file, then the
//! user-level OAuth token file, then the interactive flow. The result of
//! the flow is persisted so a second process start resolves from the
//! token file without re-running it.
//!
//! # Storage location
//!
//! Files live under the platform config directory (e.g.
//! `~/.config/tern/` on Linux) and are created with 0600 permissions on
//! Unix.

mod error;
pub mod oauth;
mod storage;

pub use error::{AuthError, AuthResult};
pub use storage::{
    Credential, CredentialProvider, CredentialStore, FileCredentialProvider,
    StaticCredentialProvider,
};

/// Environment variable consulted first during resolution.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Get the default credential directory for the current platform.
pub fn default_auth_dir() -> Option<std::path::PathBuf> {
    tern_util::path::config_dir()
}
