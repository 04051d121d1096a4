//! Credential storage implementation.

use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A resolved credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Static API key.
    ApiKey(String),
    /// OAuth bearer token.
    OAuth(String),
}

impl Credential {
    /// Check if this is an API key.
    pub fn is_api_key(&self) -> bool {
        matches!(self, Self::ApiKey(_))
    }

    /// Get the secret value regardless of kind.
    pub fn secret(&self) -> &str {
        match self {
            Self::ApiKey(key) => key,
            Self::OAuth(token) => token,
        }
    }

    /// Human-readable kind, for status display.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => "API key",
            Self::OAuth(_) => "OAuth token",
        }
    }
}

/// File-backed credential store.
///
/// Two files under the config directory: `api_key` for a static key,
/// `oauth_token` for a bearer token acquired through the interactive
/// flow. Both are written with 0600 permissions on Unix.
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    /// Create a store at the default platform location.
    pub fn new() -> AuthResult<Self> {
        let dir = crate::default_auth_dir().ok_or(AuthError::NoConfigDir)?;
        Ok(Self { dir })
    }

    /// Create a store at a custom directory (used in tests).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the API key file.
    pub fn api_key_path(&self) -> PathBuf {
        self.dir.join("api_key")
    }

    /// Path of the OAuth token file.
    pub fn oauth_token_path(&self) -> PathBuf {
        self.dir.join("oauth_token")
    }

    /// Resolve a credential: environment value, then key file, then
    /// token file. `env` is the value of [`crate::API_KEY_ENV`], passed
    /// in by the caller so resolution stays testable.
    pub async fn resolve(&self, env: Option<String>) -> AuthResult<Credential> {
        if let Some(key) = env.filter(|k| !k.trim().is_empty()) {
            debug!("Resolved credential from environment");
            return Ok(Credential::ApiKey(key.trim().to_string()));
        }

        if let Some(key) = self.read_secret(&self.api_key_path()).await? {
            debug!(path = %self.api_key_path().display(), "Resolved credential from key file");
            return Ok(Credential::ApiKey(key));
        }

        if let Some(token) = self.read_secret(&self.oauth_token_path()).await? {
            debug!(path = %self.oauth_token_path().display(), "Resolved credential from token file");
            return Ok(Credential::OAuth(token));
        }

        Err(AuthError::NoCredential)
    }

    /// Persist an OAuth token acquired through the interactive flow.
    pub async fn store_oauth_token(&self, token: &str) -> AuthResult<()> {
        self.write_secret(&self.oauth_token_path(), token).await
    }

    /// Persist a static API key.
    pub async fn store_api_key(&self, key: &str) -> AuthResult<()> {
        self.write_secret(&self.api_key_path(), key).await
    }

    /// Remove all stored credentials. Returns `true` if anything existed.
    pub async fn clear(&self) -> AuthResult<bool> {
        let mut removed = false;
        for path in [self.api_key_path(), self.oauth_token_path()] {
            if path.exists() {
                tokio::fs::remove_file(&path).await?;
                removed = true;
            }
        }
        Ok(removed)
    }

    async fn read_secret(&self, path: &Path) -> AuthResult<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(path).await?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(Some(trimmed.to_string()))
    }

    async fn write_secret(&self, path: &Path, value: &str) -> AuthResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(path, value).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(path, perms).await.map_err(|e| {
                AuthError::Permissions(format!("Failed to set permissions on {path:?}: {e}"))
            })?;
        }

        debug!(path = %path.display(), "Wrote credential file");
        Ok(())
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("dir", &self.dir)
            .finish()
    }
}

/// Source of credentials, injected at construction.
///
/// Implementations decide the caching policy: the session resolves once
/// at startup, while the proxy re-queries on every request so external
/// token rotation is picked up without a restart.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Produce the current credential.
    async fn credential(&self) -> AuthResult<Credential>;
}

/// Provider that re-reads the credential files on every call.
pub struct FileCredentialProvider {
    store: CredentialStore,
}

impl FileCredentialProvider {
    /// Create a provider over the default store location.
    pub fn new() -> AuthResult<Self> {
        Ok(Self {
            store: CredentialStore::new()?,
        })
    }

    /// Create a provider over a custom store.
    pub fn with_store(store: CredentialStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialProvider for FileCredentialProvider {
    async fn credential(&self) -> AuthResult<Credential> {
        // Deliberately uncached: rotation of the underlying file is
        // picked up on the next request.
        self.store
            .resolve(std::env::var(crate::API_KEY_ENV).ok())
            .await
    }
}

/// Provider that always returns a fixed credential (tests, headless).
pub struct StaticCredentialProvider(pub Credential);

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn credential(&self) -> AuthResult<Credential> {
        Ok(self.0.clone())
    }
}
