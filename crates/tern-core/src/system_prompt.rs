//! System prompt generation.

use std::path::Path;

/// Static portion of the system prompt.
const BASE_PROMPT: &str = "You are tern, an AI coding assistant for the terminal.

You have access to tools for reading, writing, and editing files, running bash commands, and searching with glob and grep.
Be concise and efficient. Your output is displayed on a command line interface.
When using tools, wait for results before continuing.";

/// Build the full system prompt: static text plus live working-directory
/// and system descriptors.
pub fn build(cwd: &Path) -> String {
    format!(
        "{BASE_PROMPT}\n\nCurrent working directory: {}\nSystem: {} ({})",
        cwd.display(),
        std::env::consts::OS,
        std::env::consts::ARCH,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_build_includes_cwd() {
        let prompt = build(&PathBuf::from("/work/project"));
        assert!(prompt.contains("You are tern"));
        assert!(prompt.contains("Current working directory: /work/project"));
        assert!(prompt.contains(std::env::consts::OS));
    }
}
