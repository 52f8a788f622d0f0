/// Market API Catalog
///
/// Fixed set of market-data endpoints and ticker symbols the resolver may
/// pick from. The catalog is rendered as model context and doubles as the
/// allow-list when a model decision is validated into an ApiTarget.
use crate::resolver::IntentDecision;
use crate::{QuotedeskError, Result};
use std::fmt::Write as _;

/// One tradable symbol with its display names (the service answers Korean
/// queries, so both names are shown to the model)
#[derive(Debug, Clone, Copy)]
pub struct TickerEntry {
    pub name: &'static str,
    pub alias: &'static str,
    pub symbol: &'static str,
}

pub const STOCK_TICKERS: &[TickerEntry] = &[
    TickerEntry {
        name: "Tesla",
        alias: "테슬라",
        symbol: "TSLA.O",
    },
    TickerEntry {
        name: "Nvidia",
        alias: "엔비디아",
        symbol: "NVDA.O",
    },
    TickerEntry {
        name: "QuantumScape",
        alias: "퀀텀스케이프",
        symbol: "QS",
    },
    TickerEntry {
        name: "NuScale Power",
        alias: "뉴스케일파워",
        symbol: "SMR",
    },
];

pub const CRYPTO_TICKERS: &[TickerEntry] = &[
    TickerEntry {
        name: "Bitcoin (Upbit)",
        alias: "비트코인(업비트)",
        symbol: "BTC_KRW_UPBIT",
    },
    TickerEntry {
        name: "Bitcoin (Bithumb)",
        alias: "비트코인(빗썸)",
        symbol: "BTC_KRW_BITHUMB",
    },
    TickerEntry {
        name: "Ethereum (Upbit)",
        alias: "이더리움(업비트)",
        symbol: "ETH_KRW_UPBIT",
    },
    TickerEntry {
        name: "Ethereum (Bithumb)",
        alias: "이더리움(빗썸)",
        symbol: "ETH_KRW_BITHUMB",
    },
    TickerEntry {
        name: "Cardano (Upbit)",
        alias: "에이다(업비트)",
        symbol: "ADA_KRW_UPBIT",
    },
    TickerEntry {
        name: "Cardano (Bithumb)",
        alias: "에이다(빗썸)",
        symbol: "ADA_KRW_BITHUMB",
    },
    TickerEntry {
        name: "Ripple (Upbit)",
        alias: "리플(업비트)",
        symbol: "XRP_KRW_UPBIT",
    },
    TickerEntry {
        name: "Ripple (Bithumb)",
        alias: "리플(빗썸)",
        symbol: "XRP_KRW_BITHUMB",
    },
];

/// Validated, server-side description of the one outbound call to make.
/// The dispatcher consumes this and only this; a raw URL string from the
/// model is never dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiTarget {
    Stock { ticker: String },
    Crypto { tickers: Vec<String> },
}

/// The two fixed market-data endpoints. The bases are fields (not
/// constants) only so tests can point them at a local mock server; there
/// is no mechanism for adding providers.
#[derive(Debug, Clone)]
pub struct MarketCatalog {
    pub stock_endpoint: String,
    pub crypto_endpoint: String,
}

impl Default for MarketCatalog {
    fn default() -> Self {
        Self {
            stock_endpoint: "https://polling.finance.naver.com/api/realtime/worldstock/stock"
                .to_string(),
            crypto_endpoint: "https://m.stock.naver.com/front-api/realTime/crypto".to_string(),
        }
    }
}

impl MarketCatalog {
    /// Render the catalog as the human-readable context handed to the model
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("Available market data APIs\n\n");

        out.push_str("Stock realtime quote API:\n");
        let _ = writeln!(out, "GET {}\n", self.stock_endpoint);
        out.push_str("Stock tickers:\n");
        for t in STOCK_TICKERS {
            let _ = writeln!(out, "{} ({}): {}", t.name, t.alias, t.symbol);
        }
        out.push_str(
            "\nA stock request appends \"/\" and the ticker to the URL and has no payload.\n\n",
        );

        out.push_str("Crypto realtime quote API:\n");
        let _ = writeln!(out, "POST {}\n", self.crypto_endpoint);
        out.push_str("Crypto tickers:\n");
        for t in CRYPTO_TICKERS {
            let _ = writeln!(out, "{} ({}): {}", t.name, t.alias, t.symbol);
        }
        out.push_str(
            "\nA crypto request sends a JSON payload whose \"fqnfTickers\" field lists the chosen tickers.\n",
        );

        out
    }

    /// Validate a model decision into an enumerated target. The URL must be
    /// one of the two catalog endpoints, the method must match that
    /// endpoint, and every ticker must appear in the catalog table.
    pub fn resolve_target(&self, decision: &IntentDecision) -> Result<ApiTarget> {
        let url = decision.selected_url.trim().trim_end_matches('/');
        let method = decision.selected_http_method.trim().to_ascii_uppercase();

        if let Some(ticker) = self.match_stock_url(url, decision) {
            if method != "GET" {
                return Err(QuotedeskError::UnsupportedTarget(format!(
                    "method {} not allowed for the stock endpoint",
                    method
                )));
            }
            let ticker = ticker?;
            if !STOCK_TICKERS.iter().any(|t| t.symbol == ticker) {
                return Err(QuotedeskError::UnsupportedTarget(format!(
                    "unknown stock ticker: {}",
                    ticker
                )));
            }
            return Ok(ApiTarget::Stock { ticker });
        }

        if url == self.crypto_endpoint.trim_end_matches('/') {
            if method != "POST" {
                return Err(QuotedeskError::UnsupportedTarget(format!(
                    "method {} not allowed for the crypto endpoint",
                    method
                )));
            }
            let tickers = decision.crypto_tickers();
            if tickers.is_empty() {
                return Err(QuotedeskError::MalformedModelOutput(
                    "decision carries no crypto tickers".to_string(),
                ));
            }
            for t in &tickers {
                if !CRYPTO_TICKERS.iter().any(|c| c.symbol == t) {
                    return Err(QuotedeskError::UnsupportedTarget(format!(
                        "unknown crypto ticker: {}",
                        t
                    )));
                }
            }
            return Ok(ApiTarget::Crypto { tickers });
        }

        Err(QuotedeskError::UnsupportedTarget(format!(
            "url not in catalog: {}",
            decision.selected_url
        )))
    }

    /// Match a stock-endpoint URL and extract the ticker. The model is
    /// instructed to return the bare base plus a `ticker` field, but it
    /// sometimes returns the fully joined URL; a joined URL is accepted
    /// only when its suffix is itself a catalog symbol.
    fn match_stock_url(
        &self,
        url: &str,
        decision: &IntentDecision,
    ) -> Option<Result<String>> {
        let base = self.stock_endpoint.trim_end_matches('/');
        if url == base {
            let ticker = decision
                .ticker
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty());
            return Some(ticker.map(str::to_string).ok_or_else(|| {
                QuotedeskError::MalformedModelOutput(
                    "decision carries no ticker for the stock endpoint".to_string(),
                )
            }));
        }
        if let Some(rest) = url.strip_prefix(base) {
            if let Some(suffix) = rest.strip_prefix('/') {
                if STOCK_TICKERS.iter().any(|t| t.symbol == suffix) {
                    return Some(Ok(suffix.to_string()));
                }
            }
        }
        None
    }
}
