//! Glob tool - find files by pattern.

use crate::{Tool, ToolContext, ToolError, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use tern_util::path::expand_user;

/// Maximum number of results returned.
const MAX_RESULTS: usize = 100;

/// Find files by glob pattern.
pub struct GlobTool;

#[async_trait]
impl Tool for GlobTool {
    fn id(&self) -> &str {
        "glob"
    }

    fn description(&self) -> &str {
        r#"Fast file pattern matching tool.

- Supports glob patterns like "**/*.js" or "src/**/*.ts"
- Returns matching file paths sorted by modification time (newest first)
- Results are capped at 100 entries"#
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["pattern"],
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "The glob pattern to match files against"
                },
                "path": {
                    "type": "string",
                    "description": "The directory to search in (defaults to current directory)"
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let pattern = args["pattern"]
            .as_str()
            .ok_or_else(|| ToolError::validation("pattern is required"))?;

        let base_path = args["path"]
            .as_str()
            .map(|p| expand_user(&PathBuf::from(p)))
            .unwrap_or_else(|| ctx.cwd.clone());

        let base_path = if base_path.is_absolute() {
            base_path
        } else {
            ctx.cwd.join(&base_path)
        };

        if !base_path.exists() {
            return Err(ToolError::validation(format!(
                "Path does not exist: {}",
                base_path.display()
            )));
        }

        let walker = globwalk::GlobWalkerBuilder::from_patterns(&base_path, &[pattern])
            .follow_links(false)
            .build()
            .map_err(|e| ToolError::invalid_pattern(e.to_string()))?;

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in walker {
            if ctx.abort.is_cancelled() {
                return Err(ToolError::Cancelled);
            }
            match entry {
                Ok(e) => {
                    if e.path().is_file() {
                        files.push(e.path().to_path_buf());
                    }
                }
                Err(_) => continue,
            }
        }

        // Most recently touched first
        files.sort_by(|a, b| {
            let a_time = a.metadata().and_then(|m| m.modified()).ok();
            let b_time = b.metadata().and_then(|m| m.modified()).ok();
            b_time.cmp(&a_time)
        });

        let total = files.len();
        files.truncate(MAX_RESULTS);
        let count = files.len();

        let output = files
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(
            ToolOutput::new(format!("Glob: {pattern} ({count} files)"), output).with_metadata(
                json!({
                    "count": count,
                    "truncated": total > MAX_RESULTS
                }),
            ),
        )
    }
}
