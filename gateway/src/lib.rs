// Quotedesk HTTP gateway
//
// Exposes the query pipeline over HTTP: POST / answers a free-text market
// query, GET /healthz reports liveness.

pub mod config;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use config::GatewayConfig;
use quotedesk_core::{
    IntentResolver, LlmClient, MarketDataClient, QueryPipeline, QuotedeskError, Summarizer,
    TextGenerator,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QueryPipeline>,
}

/// Build the gateway router over the given state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(query_handler))
        .route("/healthz", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Construct the pipeline from an explicit config. Everything the request
/// handlers share is built here, once, and is immutable afterwards.
pub fn build_state(config: &GatewayConfig) -> quotedesk_core::Result<AppState> {
    let llm: Arc<dyn TextGenerator> = Arc::new(LlmClient::new(config.llm_client_config()?)?);
    let catalog = Arc::new(config.market_catalog());

    let resolver = IntentResolver::new(Arc::clone(&llm), Arc::clone(&catalog));
    let market = MarketDataClient::new(catalog, config.market_data_config());
    let summarizer = Summarizer::new(llm);

    Ok(AppState {
        pipeline: Arc::new(QueryPipeline::new(resolver, market, summarizer)),
    })
}

/// Start the gateway and serve until Ctrl+C
pub async fn serve(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = build_state(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(
        target: "gateway",
        addr = %config.bind_addr,
        "Quotedesk gateway ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    info!(target: "gateway", "Shutting down...");
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn query_handler(
    State(state): State<AppState>,
    body: String,
) -> Result<String, ApiError> {
    let answer = state.pipeline.answer(&body).await.map_err(ApiError)?;
    Ok(answer)
}

/// Maps the core error taxonomy onto stable HTTP error codes. Full detail
/// is logged; only the code reaches the caller.
pub struct ApiError(pub QuotedeskError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match err {
            QuotedeskError::MalformedModelOutput(_)
            | QuotedeskError::UnsupportedTarget(_)
            | QuotedeskError::ModelBackend(_)
            | QuotedeskError::DownstreamHttp(_)
            | QuotedeskError::Encoding(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!(target: "gateway", error = %err, code = err.code(), "Query failed");
        (status, err.code().to_string()).into_response()
    }
}
