/// Response Summarizer
///
/// Turns the raw downstream API bytes into a user-facing answer via the
/// model. The model output is returned verbatim; there is no schema to
/// validate on this side.
use crate::llm::TextGenerator;
use crate::{QuotedeskError, Result};
use std::sync::Arc;
use tracing::debug;

const SUMMARY_PROMPT: &str = r#"Context:
{context}

User input:
{user_input}

Answer the user input using the market data in the context. Reply with the
relevant value(s) in one or two short sentences."#;

pub fn render_summary_prompt(context: &str, user_input: &str) -> String {
    SUMMARY_PROMPT
        .replace("{context}", context)
        .replace("{user_input}", user_input)
}

pub struct Summarizer {
    llm: Arc<dyn TextGenerator>,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    /// Summarize raw downstream bytes into an answer for the user. The
    /// bytes must decode as UTF-8; anything else is an encoding failure.
    pub async fn summarize(&self, raw: &[u8], user_query: &str) -> Result<String> {
        let context = std::str::from_utf8(raw).map_err(|e| {
            QuotedeskError::Encoding(format!("Downstream payload is not UTF-8: {e}"))
        })?;
        debug!(target: "summarizer", context_bytes = raw.len(), "Summarizing market data");
        let prompt = render_summary_prompt(context, user_query);
        self.llm.complete(&prompt).await
    }
}
