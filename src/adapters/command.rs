//! Subprocess summarizer.
//!
//! Spawns an external command (by default `fabric -p summarize`), writes the
//! scene text to its stdin and takes stdout as the summary. Any model runner
//! with that shape works, e.g. a small wrapper script around a Pegasus
//! checkpoint.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::Summarizer;
use crate::config::SummarizerSettings;

/// Summarizer backed by an external command
#[derive(Debug, Clone)]
pub struct CommandSummarizer {
    program: String,
    args: Vec<String>,
}

impl CommandSummarizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from settings.
    ///
    /// For the default `fabric` program, looks for `fabric-ai` first
    /// (Homebrew install name) and falls back to `fabric`.
    pub fn from_settings(settings: &SummarizerSettings) -> Self {
        let program = if settings.program == "fabric"
            && std::process::Command::new("fabric-ai")
                .arg("--help")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .is_ok()
        {
            "fabric-ai".to_string()
        } else {
            settings.program.clone()
        };

        Self::new(program, settings.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, input: &str, limit: Duration) -> Result<String> {
        debug!(program = %self.program, bytes = input.len(), "Spawning summarizer");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn summarizer '{}'", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .context("Failed to write to summarizer stdin")?;
            // Drop stdin to signal EOF
        }

        let output = timeout(limit, child.wait_with_output())
            .await
            .with_context(|| format!("Summarizer '{}' timed out after {:?}", self.program, limit))?
            .with_context(|| format!("Failed to wait for summarizer '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            anyhow::bail!(
                "Summarizer '{}' failed with exit code {}: {}",
                self.program,
                exit_code,
                stderr.trim()
            );
        }

        let stdout = String::from_utf8(output.stdout).context("Summarizer output is not valid UTF-8")?;
        Ok(stdout.trim().to_string())
    }
}

#[async_trait]
impl Summarizer for CommandSummarizer {
    fn name(&self) -> &str {
        &self.program
    }

    async fn summarize(&self, text: &str, timeout: Duration) -> Result<String> {
        self.run(text, timeout).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_custom_program_kept() {
        let settings = SummarizerSettings {
            program: "/opt/bin/pegasus".to_string(),
            args: vec!["--max-len".to_string(), "64".to_string()],
        };
        let summarizer = CommandSummarizer::from_settings(&settings);
        assert_eq!(summarizer.program(), "/opt/bin/pegasus");
        assert_eq!(summarizer.name(), "/opt/bin/pegasus");
    }

    #[tokio::test]
    async fn test_summarize_reads_stdout() {
        // `head -c 5` echoes the first five bytes of stdin
        let summarizer = CommandSummarizer::new("head", vec!["-c".to_string(), "5".to_string()]);
        let summary = summarizer
            .summarize("Erin and the girls", Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(summary, "Erin");
    }

    #[tokio::test]
    async fn test_failing_command() {
        let summarizer = CommandSummarizer::new(
            "sh",
            vec!["-c".to_string(), "cat > /dev/null; echo broken >&2; exit 3".to_string()],
        );
        let err = summarizer
            .summarize("text", Duration::from_secs(10))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed with exit code 3: broken"));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let summarizer = CommandSummarizer::new("scenecut-no-such-summarizer", Vec::new());
        let err = summarizer
            .summarize("text", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to spawn summarizer"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let summarizer = CommandSummarizer::new("sleep", vec!["5".to_string()]);
        let err = summarizer
            .summarize("", Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
