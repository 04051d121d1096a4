//! The session and its agent loop.
//!
//! One session owns exactly one conversation and drives the repeated
//! request/tool/response cycle: submit the full conversation, inspect
//! the stop reason, execute demanded tools sequentially, append
//! id-matched results, and resubmit until the model produces a final
//! text answer.

use crate::config::Config;
use crate::conversation::Conversation;
use crate::error::{CoreError, CoreResult};
use crate::system_prompt;
use std::path::PathBuf;
use std::sync::Arc;
use tern_provider::{
    ApiRequest, BoxedModelClient, ContentBlock, StopReason, ToolSchema,
};
use tern_tools::{ToolContext, ToolOutcome, ToolRegistry};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Events emitted while a turn is in flight.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A text block from the model, streamed in arrival order. Text may
    /// precede tool calls within the same turn.
    Text(String),
    /// A tool execution is starting.
    ToolStarted { id: String, name: String },
    /// A tool execution finished.
    ToolCompleted {
        id: String,
        success: bool,
        title: String,
    },
}

/// An interactive session: one conversation, one client, one tool set.
pub struct Session {
    client: BoxedModelClient,
    tools: Arc<ToolRegistry>,
    conversation: Conversation,
    config: Config,
    cwd: PathBuf,
    schemas: Vec<ToolSchema>,
    abort: CancellationToken,
}

impl Session {
    /// Create a session.
    pub fn new(
        client: BoxedModelClient,
        tools: Arc<ToolRegistry>,
        config: Config,
        cwd: PathBuf,
    ) -> Self {
        let schemas = tool_schemas(&tools);
        Self {
            client,
            tools,
            conversation: Conversation::new(),
            config,
            cwd,
            schemas,
            abort: CancellationToken::new(),
        }
    }

    /// Clear the conversation. Credentials are untouched.
    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    /// The conversation log (read-only).
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run one user turn to completion.
    ///
    /// Returns the final answer text. Interleaved text and tool progress
    /// are delivered through `events` as they happen. Transport and API
    /// errors abort the turn; tool failures are fed back to the model.
    pub async fn run_turn(
        &mut self,
        user_text: &str,
        events: &mpsc::UnboundedSender<SessionEvent>,
    ) -> CoreResult<String> {
        self.conversation.push_user(user_text);

        let mut final_text = String::new();
        let mut rounds: u32 = 0;

        loop {
            if self.abort.is_cancelled() {
                return Err(CoreError::Cancelled);
            }

            rounds += 1;
            if rounds > self.config.max_rounds {
                warn!(max_rounds = self.config.max_rounds, "Round cap reached");
                return Err(CoreError::RoundLimit(self.config.max_rounds));
            }

            let request = ApiRequest {
                model: self.config.model.clone(),
                max_tokens: self.config.max_tokens,
                system: Some(system_prompt::build(&self.cwd)),
                messages: self.conversation.messages().to_vec(),
                tools: self.schemas.clone(),
            };

            debug!(
                round = rounds,
                messages = request.messages.len(),
                "Submitting request"
            );

            let response = self.client.complete(&request).await?;

            // Stream text blocks in original order; they may precede
            // tool calls in the same turn.
            for block in &response.content {
                if let ContentBlock::Text { text } = block {
                    if !text.is_empty() {
                        final_text.push_str(text);
                        let _ = events.send(SessionEvent::Text(text.clone()));
                    }
                }
            }

            if response.stop_reason() != StopReason::ToolUse {
                self.conversation.push_assistant(response.content);
                debug_assert!(self.conversation.verify_tool_pairing());
                info!(rounds, "Turn completed");
                return Ok(final_text);
            }

            // Tool branch: append the assistant turn with all blocks in
            // original order, then execute every demand sequentially.
            let demands: Vec<(String, String, serde_json::Value)> = response
                .content
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolUse { id, name, input } => {
                        Some((id.clone(), name.clone(), input.clone()))
                    }
                    _ => None,
                })
                .collect();

            self.conversation.push_assistant(response.content);

            let mut results = Vec::with_capacity(demands.len());
            for (id, name, input) in demands {
                let _ = events.send(SessionEvent::ToolStarted {
                    id: id.clone(),
                    name: name.clone(),
                });

                let outcome = self.execute_tool(&name, input).await;

                let _ = events.send(SessionEvent::ToolCompleted {
                    id: id.clone(),
                    success: outcome.success,
                    title: name.clone(),
                });

                results.push(ContentBlock::tool_result(id, outcome.to_wire()));
            }

            self.conversation.push_tool_results(results);
            debug_assert!(self.conversation.verify_tool_pairing());
        }
    }

    /// Execute one tool demand, recovering every failure into an outcome.
    async fn execute_tool(&self, name: &str, input: serde_json::Value) -> ToolOutcome {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = %name, "Unknown tool demanded");
            return ToolOutcome::failure(format!("Unknown tool: {name}"));
        };

        let ctx = ToolContext {
            cwd: self.cwd.clone(),
            abort: self.abort.child_token(),
        };

        info!(tool = %name, "Executing tool");
        match tool.execute(input, &ctx).await {
            Ok(output) => {
                debug!(tool = %name, title = %output.title, "Tool succeeded");
                ToolOutcome::ok(&output)
            }
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool failed");
                ToolOutcome::err(&e)
            }
        }
    }
}

/// Build the static tool catalog from a registry.
pub fn tool_schemas(registry: &ToolRegistry) -> Vec<ToolSchema> {
    let mut schemas: Vec<ToolSchema> = registry
        .all()
        .map(|tool| ToolSchema {
            name: tool.id().to_string(),
            description: tool.description().to_string(),
            input_schema: tool.parameters_schema(),
        })
        .collect();
    // Stable catalog order across requests.
    schemas.sort_by(|a, b| a.name.cmp(&b.name));
    schemas
}
