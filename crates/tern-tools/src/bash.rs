//! Bash tool - execute shell commands.
//!
//! Executes shell commands with:
//! - Configurable timeout (default 2 minutes, max 10 minutes)
//! - Combined stdout/stderr capture
//! - Output truncation for large outputs
//! - Hard cancellation on timeout (the subprocess is killed)

use crate::{Tool, ToolContext, ToolError, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default timeout in seconds (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Maximum timeout in seconds (10 minutes).
const MAX_TIMEOUT_SECS: u64 = 600;

/// Maximum output size in characters before truncation.
const MAX_OUTPUT_SIZE: usize = 30_000;

/// Execute shell commands.
pub struct BashTool;

#[derive(Debug, Deserialize)]
struct BashArgs {
    command: String,
    timeout: Option<u64>,
}

#[async_trait]
impl Tool for BashTool {
    fn id(&self) -> &str {
        "bash"
    }

    fn description(&self) -> &str {
        r#"Executes a given bash command with optional timeout.

Usage notes:
- The command argument is required.
- You can specify an optional timeout in seconds (up to 600).
- Commands time out after 120 seconds by default.
- stdout and stderr are captured together.
- Output is truncated if it exceeds 30000 characters."#
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["command"],
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The command to execute"
                },
                "timeout": {
                    "type": "integer",
                    "description": "Timeout in seconds (default 120, max 600)"
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let args: BashArgs = serde_json::from_value(args)
            .map_err(|e| ToolError::validation(format!("Invalid arguments: {e}")))?;

        if args.command.trim().is_empty() {
            return Err(ToolError::validation("Command cannot be empty"));
        }

        let timeout = Duration::from_secs(
            args.timeout
                .unwrap_or(DEFAULT_TIMEOUT_SECS)
                .min(MAX_TIMEOUT_SECS),
        );

        debug!(
            command = %args.command,
            timeout_secs = timeout.as_secs(),
            "Executing bash command"
        );

        let mut cmd = Command::new("bash");
        cmd.arg("-c")
            .arg(&args.command)
            .current_dir(&ctx.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Avoid interactive prompts
        cmd.env("TERM", "dumb");
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd.env("NO_COLOR", "1");

        let mut child = cmd
            .spawn()
            .map_err(|e| ToolError::execution_failed(format!("Failed to spawn process: {e}")))?;

        let result = tokio::time::timeout(timeout, async {
            let stdout = child.stdout.take();
            let stderr = child.stderr.take();

            let stdout_handle = tokio::spawn(async move {
                let mut buf = Vec::new();
                if let Some(mut stdout) = stdout {
                    stdout.read_to_end(&mut buf).await.ok();
                }
                buf
            });

            let stderr_handle = tokio::spawn(async move {
                let mut buf = Vec::new();
                if let Some(mut stderr) = stderr {
                    stderr.read_to_end(&mut buf).await.ok();
                }
                buf
            });

            let status = child.wait().await?;

            let stdout_bytes = stdout_handle.await.unwrap_or_default();
            let stderr_bytes = stderr_handle.await.unwrap_or_default();

            Ok::<_, std::io::Error>((status, stdout_bytes, stderr_bytes))
        })
        .await;

        match result {
            Ok(Ok((status, stdout_bytes, stderr_bytes))) => {
                let exit_code = status.code().unwrap_or(-1);
                let stdout = String::from_utf8_lossy(&stdout_bytes);
                let stderr = String::from_utf8_lossy(&stderr_bytes);

                let mut output = String::new();
                if !stdout.is_empty() {
                    output.push_str(&stdout);
                }
                if !stderr.is_empty() {
                    if !output.is_empty() {
                        output.push('\n');
                    }
                    output.push_str(&stderr);
                }

                let (output, truncated) = truncate_output(&output, MAX_OUTPUT_SIZE);
                if truncated {
                    warn!(command = %args.command, "Output truncated to {MAX_OUTPUT_SIZE} chars");
                }

                let title = if status.success() {
                    truncate_command(&args.command)
                } else {
                    format!("{} (exit code: {exit_code})", truncate_command(&args.command))
                };

                Ok(ToolOutput::new(title, output).with_metadata(json!({
                    "exit_code": exit_code,
                    "truncated": truncated
                })))
            }
            Ok(Err(e)) => Err(ToolError::execution_failed(format!("Process error: {e}"))),
            Err(_) => {
                // Timed out: hard cancellation, distinct from nonzero exit.
                let _ = child.kill().await;
                Err(ToolError::Timeout(timeout))
            }
        }
    }
}

/// Truncate command for display in title.
fn truncate_command(cmd: &str) -> String {
    let first_line = cmd.lines().next().unwrap_or(cmd);
    if first_line.chars().count() > 50 {
        let kept: String = first_line.chars().take(47).collect();
        format!("{kept}...")
    } else {
        first_line.to_string()
    }
}

/// Truncate output past the character budget, appending a marker.
fn truncate_output(output: &str, max: usize) -> (String, bool) {
    if output.chars().count() <= max {
        return (output.to_string(), false);
    }
    let kept: String = output.chars().take(max).collect();
    (format!("{kept}\n... (truncated)"), true)
}
