// Model backend: OpenAI-compatible Chat Completions client plus the
// TextGenerator seam the pipeline stages depend on.

mod client;

pub use client::{LlmClient, LlmClientConfig};

use crate::Result;
use async_trait::async_trait;

/// Seam between the pipeline stages and the concrete model backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a fully rendered prompt
    async fn complete(&self, prompt: &str) -> Result<String>;
}
