/// Query pipeline
///
/// One sequential pass per inbound request: resolve intent → dispatch the
/// market-data call → summarize. No stage holds mutable state, so any
/// number of pipelines can run concurrently over the same shared parts.
use crate::dispatch::MarketDataClient;
use crate::resolver::IntentResolver;
use crate::summarizer::Summarizer;
use crate::Result;
use tracing::info;

pub struct QueryPipeline {
    resolver: IntentResolver,
    market: MarketDataClient,
    summarizer: Summarizer,
}

impl QueryPipeline {
    pub fn new(resolver: IntentResolver, market: MarketDataClient, summarizer: Summarizer) -> Self {
        Self {
            resolver,
            market,
            summarizer,
        }
    }

    /// Answer a free-text market query. A resolver failure aborts before
    /// any market-data request is made.
    pub async fn answer(&self, user_query: &str) -> Result<String> {
        let target = self.resolver.resolve(user_query).await?;
        info!(target: "pipeline", api_target = ?target, "Resolved intent");

        let body = self.market.fetch(&target).await?;
        info!(target: "pipeline", bytes = body.len(), "Fetched market data");

        self.summarizer.summarize(&body, user_query).await
    }
}
