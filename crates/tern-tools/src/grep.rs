//! Grep tool - search file contents by regular expression.

use crate::{Tool, ToolContext, ToolError, ToolOutput, ToolResult};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tern_util::path::expand_user;
use tracing::debug;
use walkdir::WalkDir;

/// Maximum total matches across all files.
const MAX_MATCHES: usize = 100;

/// Maximum files enumerated when searching a directory.
const MAX_FILES: usize = 1000;

/// Maximum characters kept from a matching line.
const MAX_LINE_LEN: usize = 200;

/// Search file contents using regex.
pub struct GrepTool;

#[async_trait]
impl Tool for GrepTool {
    fn id(&self) -> &str {
        "grep"
    }

    fn description(&self) -> &str {
        r#"Fast content search tool.

- Searches file contents using regular expressions
- Supports full regex syntax (eg. "log.*Error", "function\s+\w+")
- Filter files by pattern with the filePattern parameter (eg. "*.js")
- Returns file paths, 1-based line numbers and line content
- Stops after 100 matches; matching lines are truncated to 200 characters"#
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["pattern"],
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "The regex pattern to search for"
                },
                "path": {
                    "type": "string",
                    "description": "The file or directory to search in (defaults to current directory)"
                },
                "filePattern": {
                    "type": "string",
                    "description": "File glob pattern to include in the search (e.g. \"*.js\")"
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

        let file_pattern = args["filePattern"].as_str().unwrap_or("*");

        let regex =
            Regex::new(pattern).map_err(|e| ToolError::invalid_pattern(e.to_string()))?;

        let include = glob::Pattern::new(file_pattern)
            .map_err(|e| ToolError::invalid_pattern(format!("filePattern: {e}")))?;

        if !base_path.exists() {
            return Err(ToolError::validation(format!(
                "Path does not exist: {}",
                base_path.display()
            )));
        }

        debug!(
            pattern = %pattern,
            base_path = %base_path.display(),
            file_pattern = %file_pattern,
            "Executing grep search"
        );

        // A file base path searches only that file; a directory is
        // enumerated recursively up to the file cap.
        let files: Vec<PathBuf> = if base_path.is_file() {
            vec![base_path.clone()]
        } else {
            WalkDir::new(&base_path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| {
                    e.path()
                        .file_name()
                        .map(|n| include.matches(&n.to_string_lossy()))
                        .unwrap_or(false)
                })
                .take(MAX_FILES)
                .map(|e| e.into_path())
                .collect()
        };

        let mut matches: Vec<String> = Vec::new();

        'files: for file in &files {
            if ctx.abort.is_cancelled() {
                return Err(ToolError::Cancelled);
            }

            // Unreadable files are skipped silently, never aborting the
            // overall search.
            let Ok(handle) = File::open(file) else {
                continue;
            };

            for (i, line) in BufReader::new(handle).lines().enumerate() {
                let Ok(line) = line else {
                    continue 'files;
                };
                if regex.is_match(&line) {
                    matches.push(format!(
                        "{}:{}:{}",
                        file.display(),
                        i + 1,
                        truncate_chars(line.trim_end(), MAX_LINE_LEN)
                    ));
                    if matches.len() >= MAX_MATCHES {
                        break 'files;
                    }
                }
            }
        }

        let count = matches.len();
        let output = matches.join("\n");

        Ok(
            ToolOutput::new(format!("Grep: {pattern} ({count} matches)"), output).with_metadata(
                json!({
                    "count": count,
                    "files_searched": files.len()
                }),
            ),
        )
    }
}

/// Truncate a line to a character budget.
fn truncate_chars(line: &str, max: usize) -> String {
    if line.chars().count() <= max {
        return line.to_string();
    }
    line.chars().take(max).collect()
}
