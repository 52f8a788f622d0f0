// Quotedesk Core Library
// LLM-routed market quote pipeline: resolve intent → dispatch → summarize

pub mod catalog;
pub mod dispatch;
pub mod llm;
pub mod pipeline;
pub mod resolver;
pub mod summarizer;

// Export core types
pub use catalog::{ApiTarget, MarketCatalog};
pub use dispatch::{MarketDataClient, MarketDataConfig};
pub use llm::{LlmClient, LlmClientConfig, TextGenerator};
pub use pipeline::QueryPipeline;
pub use resolver::{IntentDecision, IntentResolver};
pub use summarizer::Summarizer;

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuotedeskError {
    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    #[error("Unsupported target: {0}")]
    UnsupportedTarget(String),

    #[error("Model backend error: {0}")]
    ModelBackend(String),

    #[error("Downstream HTTP error: {0}")]
    DownstreamHttp(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QuotedeskError {
    /// Stable error code surfaced to HTTP callers in place of the message.
    pub fn code(&self) -> &'static str {
        match self {
            QuotedeskError::MalformedModelOutput(_) => "malformed_model_output",
            QuotedeskError::UnsupportedTarget(_) => "unsupported_target",
            QuotedeskError::ModelBackend(_) => "model_backend_error",
            QuotedeskError::DownstreamHttp(_) => "downstream_http_error",
            QuotedeskError::Encoding(_) => "encoding_error",
            QuotedeskError::Config(_) => "config_error",
            QuotedeskError::Io(_) => "io_error",
            QuotedeskError::Serialization(_) => "serialization_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, QuotedeskError>;
