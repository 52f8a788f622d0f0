use quotedesk_gateway::config::GatewayConfig;
use quotedesk_gateway::serve;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // .env first so RUST_LOG / LLM_* values from the file are visible below
    let _ = dotenvy::dotenv();

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,quotedesk_core=info,quotedesk_gateway=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        target: "server",
        "Starting Quotedesk gateway: query → resolve intent → dispatch → summarize"
    );

    let config = GatewayConfig::load();
    serve(config).await
}
