//! Model endpoint transport for tern.
//!
//! This crate defines the conversation data model, the JSON wire contract
//! spoken with the model endpoint, and the [`ModelClient`] trait that the
//! agent loop drives. The production implementation is
//! [`anthropic::AnthropicClient`]; [`mock::MockClient`] is a scripted
//! double for tests.

pub mod error;
pub mod message;
pub mod wire;

pub mod anthropic;
pub mod mock;

pub use error::{ProviderError, ProviderResult};
pub use message::{ContentBlock, Message, Role};
pub use wire::{ApiRequest, ApiResponse, StopReason, ToolSchema};

use async_trait::async_trait;
use std::sync::Arc;

/// The main trait for model endpoints.
///
/// One call corresponds to one HTTP exchange: the full conversation goes
/// out, one classified response comes back. There is no streaming and no
/// automatic retry; transport failures surface to the caller.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Submit a completion request and classify the result.
    async fn complete(&self, request: &ApiRequest) -> ProviderResult<ApiResponse>;

    /// Get the client ID (e.g., "anthropic", "mock").
    fn client_id(&self) -> &str;
}

/// A boxed model client for dynamic dispatch.
pub type BoxedModelClient = Arc<dyn ModelClient>;
