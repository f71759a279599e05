//! Summarizer interfaces.
//!
//! The summarization model is an external collaborator: text goes in, one
//! summary string comes out. Model loading, tokenization and truncation
//! artifacts are the adapter's concern.

pub mod command;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

pub use command::CommandSummarizer;

/// Trait for external summarizers
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Human-readable summarizer name
    fn name(&self) -> &str;

    /// Produce a summary of `text` within `timeout`
    async fn summarize(&self, text: &str, timeout: Duration) -> Result<String>;
}
