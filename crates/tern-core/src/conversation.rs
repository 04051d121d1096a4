//! Conversation state.
//!
//! An ordered, append-only log of turns that is the sole memory of the
//! session. The full sequence is sent on every request; there is no
//! summarization or truncation.

use tern_provider::{ContentBlock, Message, Role};

/// The append-only conversation log.
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Message::user(text));
    }

    /// Append an assistant turn with its full content block list.
    pub fn push_assistant(&mut self, content: Vec<ContentBlock>) {
        self.turns.push(Message::assistant_blocks(content));
    }

    /// Append a tool-result turn.
    pub fn push_tool_results(&mut self, results: Vec<ContentBlock>) {
        self.turns.push(Message::tool_results(results));
    }

    /// Clear the log (the `/clear` command).
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// The full ordered turn list.
    pub fn messages(&self) -> &[Message] {
        &self.turns
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Check the tool-use pairing invariant: every `ToolUse` block in an
    /// assistant turn is answered by exactly one id-matched `ToolResult`
    /// in the immediately following turn, with no extraneous results.
    pub fn verify_tool_pairing(&self) -> bool {
        for (i, turn) in self.turns.iter().enumerate() {
            if turn.role != Role::Assistant {
                continue;
            }
            let use_ids: Vec<&str> = turn.tool_uses().map(|(id, _, _)| id).collect();
            if use_ids.is_empty() {
                continue;
            }

            let Some(next) = self.turns.get(i + 1) else {
                return false;
            };
            let result_ids: Vec<&str> = next
                .content
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolResult { tool_use_id, .. } => Some(tool_use_id.as_str()),
                    _ => None,
                })
                .collect();

            if use_ids != result_ids {
                return false;
            }
        }
        true
    }
}
