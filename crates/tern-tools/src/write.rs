//! Write tool - write file contents.

use crate::{Tool, ToolContext, ToolError, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use tern_util::path::expand_user;
use tracing::debug;

/// Write file contents.
pub struct WriteTool;

#[async_trait]
impl Tool for WriteTool {
    fn id(&self) -> &str {
        "write"
    }

    fn description(&self) -> &str {
        r#"Writes a file to the local filesystem.

Usage:
- This tool will overwrite the existing file if there is one at the provided path.
- Parent directories are created as needed.
- ALWAYS prefer editing existing files over writing new ones."#
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["filePath", "content"],
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "The path to the file to write"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write to the file"
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let raw_path: PathBuf = args["filePath"]
            .as_str()
            .ok_or_else(|| ToolError::validation("filePath is required"))?
            .into();

        let content = args["content"]
            .as_str()
            .ok_or_else(|| ToolError::validation("content is required"))?;

        let expanded = expand_user(&raw_path);
        let file_path = if expanded.is_absolute() {
            expanded
        } else {
            ctx.cwd.join(expanded)
        };

        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&file_path, content).await?;

        debug!(path = %file_path.display(), bytes = content.len(), "Wrote file");

        // Preview (first 10 lines)
        let preview: String = content.lines().take(10).collect::<Vec<_>>().join("\n");

        Ok(ToolOutput::new(
            format!("Wrote {}", file_path.display()),
            format!("Successfully wrote {} bytes", content.len()),
        )
        .with_metadata(json!({
            "bytes": content.len(),
            "path": file_path.display().to_string(),
            "preview": preview
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn ctx(dir: &std::path::Path) -> ToolContext {
        ToolContext::new(dir)
    }

    #[tokio::test]
    async fn test_write_new_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("out.txt");

        let result = WriteTool
            .execute(
                json!({
                    "filePath": file.display().to_string(),
                    "content": "hello world"
                }),
                &ctx(dir.path()),
            )
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&file).unwrap(), "hello world");
        assert_eq!(result.metadata["bytes"], 11);
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a/b/c/deep.txt");

        WriteTool
            .execute(
                json!({
                    "filePath": file.display().to_string(),
                    "content": "nested"
                }),
                &ctx(dir.path()),
            )
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&file).unwrap(), "nested");
    }

    #[tokio::test]
    async fn test_write_overwrites_existing() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("over.txt");
        std::fs::write(&file, "old old old").unwrap();

        WriteTool
            .execute(
                json!({
                    "filePath": file.display().to_string(),
                    "content": "new"
                }),
                &ctx(dir.path()),
            )
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&file).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_write_missing_content() {
        let dir = tempdir().unwrap();
        let result = WriteTool
            .execute(json!({ "filePath": "/tmp/x.txt" }), &ctx(dir.path()))
            .await;

        assert!(matches!(result, Err(ToolError::Validation(_))));
    }
}
