/// Intent Resolver
///
/// Maps a free-text user query to one of the catalog's API targets by way
/// of the language model: render the intent prompt, extract the JSON
/// decision from the model output, then validate it against the catalog.
use crate::catalog::{ApiTarget, MarketCatalog};
use crate::llm::TextGenerator;
use crate::{QuotedeskError, Result};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Decision returned by the model for a single query. Field names match
/// the wire contract the prompt asks for; `ticker` carries the stock
/// symbol and `payload` the crypto ticker list.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentDecision {
    pub selected_url: String,
    pub selected_http_method: String,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    pub reason: String,
}

impl IntentDecision {
    /// Tickers carried in the crypto payload's `fqnfTickers` list, falling
    /// back to the single `ticker` field when the model used that instead
    pub fn crypto_tickers(&self) -> Vec<String> {
        if let Some(arr) = self
            .payload
            .as_ref()
            .and_then(|p| p.get("fqnfTickers"))
            .and_then(|v| v.as_array())
        {
            return arr
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        self.ticker
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

const INTENT_PROMPT: &str = r#"Context:
{context}

User input:
{user_input}

If the user input asks for a stock or crypto price, pick the matching API
and ticker(s) from the catalog above and respond with exactly one JSON
object in this format and nothing else:
{
  "selected_url": "the API base URL from the catalog",
  "selected_http_method": "GET or POST",
  "ticker": "the chosen ticker, for a stock request",
  "payload": {"fqnfTickers": ["the chosen tickers, for a crypto request"]},
  "reason": "why this API and ticker were selected"
}"#;

pub fn render_intent_prompt(catalog_text: &str, user_input: &str) -> String {
    INTENT_PROMPT
        .replace("{context}", catalog_text)
        .replace("{user_input}", user_input)
}

/// Locate the JSON object inside raw model output: the slice between the
/// first `{` and the last `}`. Tolerates code fences and surrounding
/// prose, and is idempotent on already-bare JSON.
pub fn extract_json_object(raw: &str) -> Result<&str> {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&raw[start..=end]),
        _ => Err(QuotedeskError::MalformedModelOutput(
            "no JSON object in model output".to_string(),
        )),
    }
}

/// Parse raw model output into a decision, classifying any parse or
/// missing-key failure as MalformedModelOutput
pub fn parse_decision(raw: &str) -> Result<IntentDecision> {
    let json = extract_json_object(raw)?;
    serde_json::from_str(json)
        .map_err(|e| QuotedeskError::MalformedModelOutput(format!("invalid decision JSON: {e}")))
}

pub struct IntentResolver {
    llm: Arc<dyn TextGenerator>,
    catalog: Arc<MarketCatalog>,
    catalog_text: String,
}

impl IntentResolver {
    pub fn new(llm: Arc<dyn TextGenerator>, catalog: Arc<MarketCatalog>) -> Self {
        let catalog_text = catalog.render();
        Self {
            llm,
            catalog,
            catalog_text,
        }
    }

    /// Resolve a user query into a validated API target
    pub async fn resolve(&self, user_query: &str) -> Result<ApiTarget> {
        let prompt = render_intent_prompt(&self.catalog_text, user_query);
        let raw = self.llm.complete(&prompt).await?;
        let decision = parse_decision(&raw)?;
        debug!(
            target: "resolver",
            url = %decision.selected_url,
            method = %decision.selected_http_method,
            reason = %decision.reason,
            "Model selected API"
        );
        self.catalog.resolve_target(&decision)
    }
}
