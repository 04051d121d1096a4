//! The JSON wire contract spoken with the model endpoint.
//!
//! One request per turn boundary: the full conversation, the system
//! prompt, and the static tool catalog go out on every call. The proxy
//! implements exactly the same shapes, so these types are shared rather
//! than private to one client.

use crate::message::Message;
use serde::{Deserialize, Serialize};

/// Static catalog entry describing one built-in tool to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name as the model must reference it.
    pub name: String,
    /// What the tool does.
    pub description: String,
    /// JSON Schema for the tool's arguments.
    pub input_schema: serde_json::Value,
}

/// The request envelope for `POST /v1/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRequest {
    /// Model identifier.
    pub model: String,
    /// Token budget ceiling for the response.
    pub max_tokens: u32,
    /// System prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// The full conversation, oldest first.
    pub messages: Vec<Message>,
    /// The static tool catalog.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSchema>,
}

/// The response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Content blocks, text and tool-use interleaved in model order.
    pub content: Vec<crate::message::ContentBlock>,
    /// Raw stop reason string; absent on some error shapes.
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Model identifier echoed by the endpoint, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ApiResponse {
    /// Build a plain final-answer response.
    pub fn end_turn(text: impl Into<String>) -> Self {
        Self {
            content: vec![crate::message::ContentBlock::text(text)],
            stop_reason: Some("end_turn".to_string()),
            model: None,
        }
    }

    /// Classify the stop reason.
    pub fn stop_reason(&self) -> StopReason {
        StopReason::from_wire(self.stop_reason.as_deref().unwrap_or(""))
    }
}

/// Response-level classifier: final answer vs. tool execution required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Final answer, conversation returns to the user.
    EndTurn,
    /// The model demands tool execution before it can continue.
    ToolUse,
    /// The response hit the token ceiling.
    MaxTokens,
    /// Any other (or missing) stop reason; treated as a final answer.
    Other(String),
}

impl StopReason {
    /// Parse the wire string.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "end_turn" => StopReason::EndTurn,
            "tool_use" => StopReason::ToolUse,
            "max_tokens" => StopReason::MaxTokens,
            other => StopReason::Other(other.to_string()),
        }
    }

    /// Whether the loop must enter the tool dispatch branch.
    pub fn is_tool_use(&self) -> bool {
        matches!(self, StopReason::ToolUse)
    }
}
