//! Edit tool - single unique-substring replacement.
//!
//! The exactly-one-occurrence rule is the safety property here: an edit
//! that would touch zero or multiple locations writes nothing and fails,
//! so the model must supply a uniquely identifying substring.

use crate::{Tool, ToolContext, ToolError, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use similar::{ChangeTag, TextDiff};
use std::path::PathBuf;
use tern_util::path::expand_user;
use tokio::fs;

/// Edit tool for unique string replacement.
pub struct EditTool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditArgs {
    file_path: String,
    old_string: String,
    new_string: String,
}

#[async_trait]
impl Tool for EditTool {
    fn id(&self) -> &str {
        "edit"
    }

    fn description(&self) -> &str {
        r#"Performs an exact string replacement in a file.

Usage:
- The edit will FAIL if `oldString` is not found in the file.
- The edit will FAIL if `oldString` is found more than once. Provide a larger
  unique substring with more surrounding context to disambiguate.
- Preserve exact indentation from the original file."#
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["filePath", "oldString", "newString"],
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "The path to the file to modify"
                },
                "oldString": {
                    "type": "string",
                    "description": "The text to replace (must occur exactly once)"
                },
                "newString": {
                    "type": "string",
                    "description": "The text to replace it with"
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let args: EditArgs = serde_json::from_value(args)
            .map_err(|e| ToolError::validation(format!("Invalid arguments: {e}")))?;

        let expanded = expand_user(&PathBuf::from(&args.file_path));
        let file_path = if expanded.is_absolute() {
            expanded
        } else {
            ctx.cwd.join(expanded)
        };

        if !file_path.exists() {
            return Err(ToolError::file_not_found(file_path.display().to_string()));
        }

        if args.old_string == args.new_string {
            return Err(ToolError::validation(
                "oldString and newString must be different",
            ));
        }

        let content = fs::read_to_string(&file_path).await?;

        let count = content.matches(&args.old_string).count();
        match count {
            0 => return Err(ToolError::NoMatch),
            1 => {}
            n => return Err(ToolError::AmbiguousMatch { count: n }),
        }

        let new_content = content.replacen(&args.old_string, &args.new_string, 1);

        let (additions, deletions) = diff_counts(&content, &new_content);

        fs::write(&file_path, &new_content).await?;

        Ok(ToolOutput::new(
            format!("Edited {}", file_path.display()),
            format!("Replaced 1 occurrence (+{additions} -{deletions} lines)"),
        )
        .with_metadata(json!({
            "file": file_path.display().to_string(),
            "additions": additions,
            "deletions": deletions
        })))
    }
}

/// Count added and removed lines between two versions.
fn diff_counts(old: &str, new: &str) -> (usize, usize) {
    let diff = TextDiff::from_lines(old, new);
    let mut additions = 0;
    let mut deletions = 0;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => additions += 1,
            ChangeTag::Delete => deletions += 1,
            ChangeTag::Equal => {}
        }
    }
    (additions, deletions)
}
