//! Runtime configuration.

use serde::Deserialize;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default token budget ceiling per response.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default cap on tool-use rounds within one turn.
pub const DEFAULT_MAX_ROUNDS: u32 = 50;

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model identifier sent on every request.
    pub model: String,
    /// Token budget ceiling.
    pub max_tokens: u32,
    /// Maximum tool-use rounds per turn. Bounds the otherwise-unbounded
    /// request/tool cycle.
    pub max_rounds: u32,
    /// Proxy URL override. When set, all outbound calls go to the proxy
    /// and no auth header is attached.
    pub proxy_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_rounds: DEFAULT_MAX_ROUNDS,
            proxy_url: None,
        }
    }
}

impl Config {
    /// Build a config from defaults plus environment overrides
    /// (`TERN_MODEL`, `TERN_PROXY`).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(model) = std::env::var("TERN_MODEL") {
            if !model.trim().is_empty() {
                config.model = model.trim().to_string();
            }
        }
        if let Ok(proxy) = std::env::var("TERN_PROXY") {
            if !proxy.trim().is_empty() {
                config.proxy_url = Some(proxy.trim().to_string());
            }
        }
        config
    }
}
