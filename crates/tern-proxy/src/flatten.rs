//! Reshaping the structured envelope into a plain-text prompt.
//!
//! Both directions of this translation are lossy by construction. The
//! flattened form renders tool calls and results as bracketed text, which
//! the external agent sees as ordinary prose.

use tern_provider::{ApiRequest, ContentBlock};

/// Extract the latest user message text (simple fidelity).
pub fn latest_user_text(request: &ApiRequest) -> Option<String> {
    request
        .messages
        .iter()
        .rev()
        .find(|m| m.role.wire_name() == "user")
        .map(|m| {
            // Tool-result turns are user turns on the wire; render their
            // content too so the agent sees something, not nothing.
            m.content
                .iter()
                .map(render_block)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|text| !text.is_empty())
}

/// Flatten the entire request into one composite prompt (full fidelity).
pub fn flatten_request(request: &ApiRequest) -> String {
    let mut parts = Vec::new();

    if let Some(system) = &request.system {
        if !system.is_empty() {
            parts.push(format!("<system>\n{system}\n</system>\n"));
        }
    }

    if !request.tools.is_empty() {
        let names = request
            .tools
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("<available_tools>{names}</available_tools>\n"));
    }

    for message in &request.messages {
        let role = message.role.wire_name();
        let content = message
            .content
            .iter()
            .map(render_block)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        parts.push(format!("<{role}>\n{content}\n</{role}>\n"));
    }

    parts.join("\n")
}

/// Render one content block as text.
fn render_block(block: &ContentBlock) -> String {
    match block {
        ContentBlock::Text { text } => text.clone(),
        ContentBlock::ToolUse { name, input, .. } => {
            format!("[Tool Call: {name}({input})]")
        }
        ContentBlock::ToolResult { content, .. } => {
            format!("[Tool Result: {content}]")
        }
    }
}
