/// HTTP Dispatcher
///
/// Issues the single outbound market-data request described by a validated
/// ApiTarget and returns the raw response body. No retry, no backoff, no
/// fallback endpoint; a failed connection or non-2xx status is fatal for
/// the request.
use crate::catalog::{ApiTarget, MarketCatalog};
use crate::{QuotedeskError, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the market-data client
#[derive(Debug, Clone)]
pub struct MarketDataConfig {
    /// Timeout for API requests in milliseconds
    pub timeout_ms: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: "quotedesk/0.1".to_string(),
        }
    }
}

/// Request body for the crypto realtime endpoint
#[derive(Debug, Serialize)]
struct CryptoQuoteRequest {
    #[serde(rename = "fqnfTickers")]
    fqnf_tickers: Vec<String>,
}

/// Market-data client issuing the one outbound call per request
pub struct MarketDataClient {
    catalog: Arc<MarketCatalog>,
    http: reqwest::Client,
}

impl MarketDataClient {
    pub fn new(catalog: Arc<MarketCatalog>, config: MarketDataConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(&config.user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { catalog, http }
    }

    /// Perform the outbound request for the target and return the raw body
    pub async fn fetch(&self, target: &ApiTarget) -> Result<Vec<u8>> {
        let response = match target {
            ApiTarget::Stock { ticker } => {
                let url = stock_url(&self.catalog.stock_endpoint, ticker);
                debug!(target: "market_data", url = %url, "GET stock quote");
                self.http.get(&url).send().await
            }
            ApiTarget::Crypto { tickers } => {
                let url = &self.catalog.crypto_endpoint;
                debug!(target: "market_data", url = %url, tickers = ?tickers, "POST crypto quote");
                self.http
                    .post(url)
                    .json(&CryptoQuoteRequest {
                        fqnf_tickers: tickers.clone(),
                    })
                    .send()
                    .await
            }
        }
        .map_err(|e| {
            warn!(target: "market_data", error = %e, "Market data request failed");
            QuotedeskError::DownstreamHttp(format!("Market data request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(target: "market_data", %status, "Market data API returned error");
            return Err(QuotedeskError::DownstreamHttp(format!(
                "Market data API returned status: {status}"
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            QuotedeskError::DownstreamHttp(format!("Failed to read market data body: {e}"))
        })?;
        Ok(bytes.to_vec())
    }
}

/// Stock quote URL: endpoint base joined with the ticker
fn stock_url(base: &str, ticker: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), ticker)
}
