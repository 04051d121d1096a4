//! Built-in tool executors for tern.
//!
//! This crate provides the fixed set of tools the model can demand during
//! a conversation: read, write, edit, bash, glob, and grep. Each executor
//! is a pure function over explicit arguments that returns a
//! [`ToolOutput`] or a [`ToolError`] — never a panic past its boundary.

pub mod error;
pub mod registry;

// Tool implementations
pub mod bash;
pub mod edit;
pub mod glob;
pub mod grep;
pub mod read;
pub mod write;

pub use error::{ToolError, ToolResult};
pub use registry::ToolRegistry;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Context provided to tools during execution.
pub struct ToolContext {
    /// Current working directory, used to resolve relative paths.
    pub cwd: PathBuf,
    /// Cancellation token.
    pub abort: CancellationToken,
}

impl ToolContext {
    /// Create a context rooted at the given working directory.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            abort: CancellationToken::new(),
        }
    }
}

/// Result of a successful tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Title/summary of the operation.
    pub title: String,
    /// Output text.
    pub output: String,
    /// Tool-specific metadata.
    pub metadata: Value,
}

impl ToolOutput {
    /// Create a new tool output.
    pub fn new(title: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            output: output.into(),
            metadata: Value::Null,
        }
    }

    /// Add metadata to the output.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// The normalized result of any tool invocation, as fed back to the model.
///
/// Failures are recovered locally: a failing tool produces
/// `success: false` with the error text, and the model — not the loop —
/// decides how to react.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutcome {
    pub success: bool,
    pub payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutcome {
    /// Build a success outcome from a tool output.
    pub fn ok(output: &ToolOutput) -> Self {
        Self {
            success: true,
            payload: serde_json::json!({
                "output": output.output,
                "metadata": output.metadata,
            }),
            error: None,
        }
    }

    /// Build a failure outcome from an error.
    pub fn err(error: &ToolError) -> Self {
        Self {
            success: false,
            payload: Value::Null,
            error: Some(error.to_string()),
        }
    }

    /// Build a failure outcome from plain text (e.g. an unknown tool name).
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: Value::Null,
            error: Some(message.into()),
        }
    }

    /// Serialize to the string form carried in a tool_result block.
    pub fn to_wire(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"success":false,"error":"unserializable outcome"}"#.into())
    }
}

/// The main trait for tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool ID.
    fn id(&self) -> &str;

    /// Get the tool description (for the model).
    fn description(&self) -> &str;

    /// Get the JSON Schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool.
    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput>;
}

/// A boxed tool for dynamic dispatch.
pub type BoxedTool = Arc<dyn Tool>;
