//! External agent invocation.
//!
//! Each request gets its own subprocess with no shared state across
//! requests, so concurrent client sessions never share one subprocess's
//! stdio.

use crate::error::{ProxyError, ProxyResult};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default time allowed for one agent invocation.
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(300);

/// Invokes the external authenticated CLI agent in single-prompt mode.
#[derive(Debug, Clone)]
pub struct AgentInvoker {
    command: String,
    timeout: Duration,
}

impl AgentInvoker {
    /// Create an invoker for the given agent command (e.g. `claude`).
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    /// The configured agent command.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Probe that the agent binary is present.
    pub async fn check_available(&self) -> ProxyResult<String> {
        let output = Command::new(&self.command)
            .arg("--version")
            .output()
            .await
            .map_err(|e| {
                ProxyError::Spawn(format!("'{}' not found in PATH: {e}", self.command))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProxyError::AgentFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run the agent once in non-interactive single-prompt mode.
    ///
    /// With `structured` set, the agent is asked for JSON output so the
    /// caller can attempt to parse a structured envelope.
    pub async fn run(&self, prompt: &str, structured: bool) -> ProxyResult<String> {
        let mut cmd = Command::new(&self.command);
        cmd.arg("-p")
            .arg(prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .env("NO_COLOR", "1");

        if structured {
            cmd.arg("--output-format").arg("json");
        }

        debug!(
            command = %self.command,
            prompt_len = prompt.len(),
            structured,
            "Invoking external agent"
        );

        let child = cmd
            .spawn()
            .map_err(|e| ProxyError::Spawn(format!("'{}': {e}", self.command)))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ProxyError::Timeout(self.timeout))??;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() && stdout.is_empty() {
            warn!(code = ?output.status.code(), stderr = %stderr, "Agent exited with error");
            return Err(ProxyError::AgentFailed(if stderr.is_empty() {
                format!("exit code {:?}", output.status.code())
            } else {
                stderr
            }));
        }

        // Some agents print warnings to stderr while still answering.
        Ok(if stdout.is_empty() { stderr } else { stdout })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_invoker(dir: &std::path::Path, body: &str) -> AgentInvoker {
        let script = dir.join("fake-agent.sh");
        std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        AgentInvoker::new(script.display().to_string(), Duration::from_secs(5))
    }

    #[tokio::test]
    #[cfg_attr(windows, ignore)]
    async fn test_run_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = script_invoker(dir.path(), r#"echo "agent says hi""#);

        let output = invoker.run("prompt", false).await.unwrap();
        assert_eq!(output, "agent says hi");
    }

    #[tokio::test]
    #[cfg_attr(windows, ignore)]
    async fn test_run_receives_prompt_argument() {
        let dir = tempfile::tempdir().unwrap();
        // Echo back the second argument (the prompt after -p).
        let invoker = script_invoker(dir.path(), r#"echo "$2""#);

        let output = invoker.run("the actual prompt", false).await.unwrap();
        assert_eq!(output, "the actual prompt");
    }

    #[tokio::test]
    #[cfg_attr(windows, ignore)]
    async fn test_run_failure_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = script_invoker(dir.path(), r#"echo "broken" >&2; exit 1"#);

        match invoker.run("prompt", false).await {
            Err(ProxyError::AgentFailed(msg)) => assert_eq!(msg, "broken"),
            other => panic!("Expected AgentFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    #[cfg_attr(windows, ignore)]
    async fn test_run_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow.sh");
        std::fs::write(&script, "#!/bin/sh\nsleep 30\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        let invoker = AgentInvoker::new(script.display().to_string(), Duration::from_millis(200));

        assert!(matches!(
            invoker.run("prompt", false).await,
            Err(ProxyError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let invoker = AgentInvoker::new("definitely-not-a-real-binary", Duration::from_secs(1));
        assert!(matches!(
            invoker.run("prompt", false).await,
            Err(ProxyError::Spawn(_))
        ));
    }
}
