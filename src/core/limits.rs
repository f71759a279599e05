//! Resource limits for pipeline stages.
//!
//! Bounds the work a single run can do:
//! - Script size accepted by the loader
//! - Words handed to the summarizer per scene
//! - Time allowed for one summarizer call

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+").expect("Invalid word regex"));

/// Limits applied by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum script size in bytes (default: 10MB)
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,

    /// Words of scene text passed to the summarizer (default: 512)
    #[serde(default = "default_summary_max_words")]
    pub summary_max_words: usize,

    /// Per-scene summarizer timeout in seconds (default: 300 = 5 min)
    #[serde(default = "default_summarize_timeout")]
    pub summarize_timeout_seconds: u64,
}

fn default_max_input_bytes() -> u64 {
    10 * 1024 * 1024
} // 10MB
fn default_summary_max_words() -> usize {
    512
}
fn default_summarize_timeout() -> u64 {
    300
} // 5 min

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            summary_max_words: default_summary_max_words(),
            summarize_timeout_seconds: default_summarize_timeout(),
        }
    }
}

impl Limits {
    /// Validate script input against the size limit
    pub fn validate_input(&self, input: &str, source_path: Option<&Path>) -> Result<(), LimitViolation> {
        let size = input.len() as u64;
        if size > self.max_input_bytes {
            return Err(LimitViolation::MaxInputBytes {
                actual: size,
                limit: self.max_input_bytes,
                path: source_path
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<input>".to_string()),
            });
        }
        Ok(())
    }

    pub fn summarize_timeout(&self) -> Duration {
        Duration::from_secs(self.summarize_timeout_seconds)
    }

    /// Cut text after `summary_max_words` words, keeping original spacing.
    /// Returns the (possibly shortened) text and whether anything was cut.
    pub fn truncate_for_summary<'a>(&self, text: &'a str) -> (Cow<'a, str>, bool) {
        truncate_words(text, self.summary_max_words)
    }
}

/// Keep the first `max_words` whitespace-separated words of `text`
pub fn truncate_words(text: &str, max_words: usize) -> (Cow<'_, str>, bool) {
    if max_words == 0 {
        let truncated = WORD.is_match(text);
        return (Cow::Borrowed(""), truncated);
    }

    let mut words = WORD.find_iter(text);
    match words.nth(max_words - 1) {
        Some(last) if words.next().is_some() => (Cow::Borrowed(&text[..last.end()]), true),
        _ => (Cow::Borrowed(text), false),
    }
}

/// Limit violation errors
#[derive(Debug, Clone, Error)]
pub enum LimitViolation {
    #[error("Maximum input bytes exceeded: {actual} > {limit} ({path})")]
    MaxInputBytes { actual: u64, limit: u64, path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_input_bytes, 10 * 1024 * 1024);
        assert_eq!(limits.summary_max_words, 512);
        assert_eq!(limits.summarize_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_input_validation() {
        let limits = Limits {
            max_input_bytes: 100,
            ..Default::default()
        };

        assert!(limits.validate_input("short", None).is_ok());
        assert!(limits.validate_input(&"x".repeat(100), None).is_ok());

        let result = limits.validate_input(&"x".repeat(200), Some(Path::new("script.txt")));
        let violation = result.unwrap_err();
        assert!(violation.to_string().contains("script.txt"));
        match violation {
            LimitViolation::MaxInputBytes { actual, limit, .. } => {
                assert_eq!(actual, 200);
                assert_eq!(limit, 100);
            }
        }
    }

    #[test]
    fn test_truncate_words() {
        let (text, cut) = truncate_words("one two\nthree  four", 3);
        assert_eq!(text, "one two\nthree");
        assert!(cut);

        let (text, cut) = truncate_words("one two", 2);
        assert_eq!(text, "one two");
        assert!(!cut);

        let (text, cut) = truncate_words("one two ", 5);
        assert_eq!(text, "one two ");
        assert!(!cut);
    }

    #[test]
    fn test_truncate_to_zero_words() {
        assert_eq!(truncate_words("one", 0), (Cow::Borrowed(""), true));
        assert_eq!(truncate_words("   ", 0), (Cow::Borrowed(""), false));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let limits: Limits = serde_yaml::from_str("summary_max_words: 64").unwrap();
        assert_eq!(limits.summary_max_words, 64);
        assert_eq!(limits.max_input_bytes, 10 * 1024 * 1024);
    }
}
