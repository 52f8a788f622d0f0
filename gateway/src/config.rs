use std::fs;
use std::path::Path;

use quotedesk_core::{LlmClientConfig, MarketCatalog, MarketDataConfig, QuotedeskError};

/// High-level configuration for the gateway process. Defaults come from
/// the environment; an optional TOML file overlays them.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub bind_addr: String,
    pub llm: LlmSettings,
    pub market: MarketSettings,
}

/// Model backend settings. The key is optional at this stage so a TOML
/// overlay can still supply it; it becomes required when the client
/// config is built.
#[derive(Clone, Debug)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub request_timeout_ms: u64,
    pub temperature: f32,
}

/// Market-data settings: the two fixed endpoint bases plus client knobs
#[derive(Clone, Debug)]
pub struct MarketSettings {
    pub stock_endpoint: String,
    pub crypto_endpoint: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: std::env::var("LLM_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "https://api.x.ai/v1".to_string()),
            model: std::env::var("LLM_MODEL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "grok-beta".to_string()),
            api_key: std::env::var("LLM_API_KEY").ok().filter(|s| !s.is_empty()),
            request_timeout_ms: std::env::var("LLM_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30_000),
            temperature: std::env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse::<f32>().ok())
                .unwrap_or(0.0),
        }
    }
}

impl Default for MarketSettings {
    fn default() -> Self {
        let catalog = MarketCatalog::default();
        let client = MarketDataConfig::default();
        Self {
            stock_endpoint: catalog.stock_endpoint,
            crypto_endpoint: catalog.crypto_endpoint,
            timeout_ms: client.timeout_ms,
            user_agent: client.user_agent,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: std::env::var("QUOTEDESK_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            llm: LlmSettings::default(),
            market: MarketSettings::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a TOML file (path via QUOTEDESK_CONFIG or
    /// ./quotedesk.toml), overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let default = Self::default();
        let path = std::env::var("QUOTEDESK_CONFIG").unwrap_or_else(|_| "quotedesk.toml".into());
        let p = Path::new(&path);
        if !p.exists() {
            tracing::info!(target: "gateway", path = %path, "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => match toml::from_str::<GatewayToml>(&s) {
                Ok(t) => t.overlay(default),
                Err(e) => {
                    tracing::warn!(target: "gateway", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "gateway", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    /// Build the model client config, requiring the API key to be present
    pub fn llm_client_config(&self) -> Result<LlmClientConfig, QuotedeskError> {
        let api_key = self
            .llm
            .api_key
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| QuotedeskError::Config("LLM_API_KEY is not set".to_string()))?;
        Ok(LlmClientConfig {
            base_url: self.llm.base_url.clone(),
            model: self.llm.model.clone(),
            api_key,
            request_timeout_ms: self.llm.request_timeout_ms,
            temperature: self.llm.temperature,
        })
    }

    pub fn market_catalog(&self) -> MarketCatalog {
        MarketCatalog {
            stock_endpoint: self.market.stock_endpoint.clone(),
            crypto_endpoint: self.market.crypto_endpoint.clone(),
        }
    }

    pub fn market_data_config(&self) -> MarketDataConfig {
        MarketDataConfig {
            timeout_ms: self.market.timeout_ms,
            user_agent: self.market.user_agent.clone(),
        }
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct GatewayToml {
    pub bind_addr: Option<String>,
    pub llm: Option<LlmToml>,
    pub market: Option<MarketToml>,
}

impl GatewayToml {
    fn overlay(self, mut base: GatewayConfig) -> GatewayConfig {
        if let Some(a) = self.bind_addr {
            base.bind_addr = a;
        }
        if let Some(l) = self.llm {
            l.apply(&mut base.llm);
        }
        if let Some(m) = self.market {
            m.apply(&mut base.market);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct LlmToml {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub temperature: Option<f32>,
}

impl LlmToml {
    fn apply(self, l: &mut LlmSettings) {
        if let Some(x) = self.base_url {
            l.base_url = x;
        }
        if let Some(x) = self.model {
            l.model = x;
        }
        if let Some(x) = self.api_key {
            l.api_key = Some(x);
        }
        if let Some(x) = self.request_timeout_ms {
            l.request_timeout_ms = x;
        }
        if let Some(x) = self.temperature {
            l.temperature = x;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct MarketToml {
    pub stock_endpoint: Option<String>,
    pub crypto_endpoint: Option<String>,
    pub timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
}

impl MarketToml {
    fn apply(self, m: &mut MarketSettings) {
        if let Some(x) = self.stock_endpoint {
            m.stock_endpoint = x;
        }
        if let Some(x) = self.crypto_endpoint {
            m.crypto_endpoint = x;
        }
        if let Some(x) = self.timeout_ms {
            m.timeout_ms = x;
        }
        if let Some(x) = self.user_agent {
            m.user_agent = x;
        }
    }
}
