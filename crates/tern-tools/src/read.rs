//! Read tool - read file contents with line numbers.

use crate::{Tool, ToolContext, ToolError, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use tern_util::path::expand_user;

/// Default number of lines returned per call.
const DEFAULT_LIMIT: usize = 2000;

/// Maximum characters kept from a single line.
const MAX_LINE_LEN: usize = 2000;

/// Read file contents with line numbers.
pub struct ReadTool;

#[async_trait]
impl Tool for ReadTool {
    fn id(&self) -> &str {
        "read"
    }

    fn description(&self) -> &str {
        r#"Reads a file from the local filesystem.

Usage:
- By default, reads up to 2000 lines starting from the beginning of the file
- You can optionally specify a line offset and limit for paging through large files
- Results are returned with line numbers starting at 1
- Lines longer than 2000 characters are truncated"#
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["filePath"],
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "The path to the file to read"
                },
                "offset": {
                    "type": "integer",
                    "description": "The line number to start reading from (0-based)"
                },
                "limit": {
                    "type": "integer",
                    "description": "The number of lines to read (defaults to 2000)"
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let raw_path: PathBuf = args["filePath"]
            .as_str()
            .ok_or_else(|| ToolError::validation("filePath is required"))?
            .into();

        let offset = args["offset"].as_u64().unwrap_or(0) as usize;
        let limit = args["limit"].as_u64().unwrap_or(DEFAULT_LIMIT as u64) as usize;

        let path = resolve(&raw_path, ctx);

        if !path.exists() {
            return Err(ToolError::file_not_found(path.display().to_string()));
        }
        if path.is_dir() {
            return Err(ToolError::IsDirectory(path.display().to_string()));
        }

        // Symlink-resolved location; invalid byte sequences are replaced,
        // not fatal.
        let path = path.canonicalize().unwrap_or(path);
        let bytes = tokio::fs::read(&path).await?;
        let content = String::from_utf8_lossy(&bytes);

        let lines: Vec<&str> = content.lines().collect();
        let total_lines = lines.len();
        let start = offset.min(total_lines);
        let end = start.saturating_add(limit).min(total_lines);
        let shown_lines = end - start;

        let output = lines[start..end]
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let truncated = truncate_chars(line, MAX_LINE_LEN);
                format!("{:>6}\t{}", start + i + 1, truncated)
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(
            ToolOutput::new(format!("Read {}", path.display()), output).with_metadata(json!({
                "total_lines": total_lines,
                "shown_lines": shown_lines,
                "offset": start,
                "path": path.display().to_string()
            })),
        )
    }
}

/// Expand `~` and make the path absolute relative to the context cwd.
fn resolve(path: &std::path::Path, ctx: &ToolContext) -> PathBuf {
    let expanded = expand_user(path);
    if expanded.is_absolute() {
        expanded
    } else {
        ctx.cwd.join(expanded)
    }
}

/// Truncate a line to a character budget, marking the cut.
fn truncate_chars(line: &str, max: usize) -> String {
    if line.chars().count() <= max {
        return line.to_string();
    }
    let kept: String = line.chars().take(max).collect();
    format!("{kept}...")
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
    async fn test_read_whole_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("test.txt");
        std::fs::write(&file, "line 1\nline 2\nline 3").unwrap();

        let result = ReadTool
            .execute(
                json!({ "filePath": file.display().to_string() }),
                &ctx(dir.path()),
            )
            .await
            .unwrap();

        assert!(result.output.contains("line 1"));
        assert!(result.output.contains("line 3"));
        assert_eq!(result.metadata["total_lines"], 3);
        assert_eq!(result.metadata["shown_lines"], 3);
    }

    #[tokio::test]
    async fn test_read_paging_window() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("test.txt");
        let content = (1..=10).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        std::fs::write(&file, content).unwrap();

        let result = ReadTool
            .execute(
                json!({
                    "filePath": file.display().to_string(),
                    "offset": 3,
                    "limit": 4
                }),
                &ctx(dir.path()),
            )
            .await
            .unwrap();

        // min(limit, total - offset) lines starting at 1-based line offset+1
        assert_eq!(result.metadata["shown_lines"], 4);
        assert!(result.output.starts_with("     4\t"));
        assert!(result.output.contains("line 4"));
        assert!(result.output.contains("line 7"));
        assert!(!result.output.contains("line 3"));
        assert!(!result.output.contains("line 8"));
    }

    #[tokio::test]
    async fn test_read_offset_past_end() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("short.txt");
        std::fs::write(&file, "only\ntwo").unwrap();

        let result = ReadTool
            .execute(
                json!({
                    "filePath": file.display().to_string(),
                    "offset": 50
                }),
                &ctx(dir.path()),
            )
            .await
            .unwrap();

        assert_eq!(result.metadata["shown_lines"], 0);
        assert_eq!(result.metadata["total_lines"], 2);
        assert!(result.output.is_empty());
    }

    #[tokio::test]
    async fn test_read_total_lines_stable_across_calls() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("stable.txt");
        std::fs::write(&file, "a\nb\nc\nd").unwrap();

        let context = ctx(dir.path());
        for offset in [0u64, 1, 2] {
            let result = ReadTool
                .execute(
                    json!({ "filePath": file.display().to_string(), "offset": offset }),
                    &context,
                )
                .await
                .unwrap();
            assert_eq!(result.metadata["total_lines"], 4);
        }
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let dir = tempdir().unwrap();
        let result = ReadTool
            .execute(
                json!({ "filePath": "/nonexistent/file.txt" }),
                &ctx(dir.path()),
            )
            .await;

        assert!(matches!(result, Err(ToolError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_read_directory() {
        let dir = tempdir().unwrap();
        let result = ReadTool
            .execute(
                json!({ "filePath": dir.path().display().to_string() }),
                &ctx(dir.path()),
            )
            .await;

        assert!(matches!(result, Err(ToolError::IsDirectory(_))));
    }

    #[tokio::test]
    async fn test_read_long_line_truncated() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("long.txt");
        std::fs::write(&file, "x".repeat(3000)).unwrap();

        let result = ReadTool
            .execute(
                json!({ "filePath": file.display().to_string() }),
                &ctx(dir.path()),
            )
            .await
            .unwrap();

        assert!(result.output.contains(&"x".repeat(2000)));
        assert!(!result.output.contains(&"x".repeat(2001)));
        assert!(result.output.ends_with("..."));
    }

    #[tokio::test]
    async fn test_read_invalid_utf8_is_replaced() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bin.txt");
        std::fs::write(&file, b"before\xFF\xFEafter").unwrap();

        let result = ReadTool
            .execute(
                json!({ "filePath": file.display().to_string() }),
                &ctx(dir.path()),
            )
            .await
            .unwrap();

        assert!(result.output.contains("before"));
        assert!(result.output.contains("after"));
    }

    #[tokio::test]
    async fn test_read_relative_path_resolved_against_cwd() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("rel.txt"), "relative content").unwrap();

        let result = ReadTool
            .execute(json!({ "filePath": "rel.txt" }), &ctx(dir.path()))
            .await
            .unwrap();

        assert!(result.output.contains("relative content"));
    }
}
