use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use quotedesk_core::{
    IntentResolver, MarketCatalog, MarketDataClient, MarketDataConfig, QueryPipeline,
    QuotedeskError, Summarizer, TextGenerator,
};
use quotedesk_gateway::{build_router, AppState};

/// Scripted stand-in for the model backend: replays canned completions in
/// order, one per call.
struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedModel {
    fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for ScriptedModel {
    async fn complete(&self, _prompt: &str) -> quotedesk_core::Result<String> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| QuotedeskError::ModelBackend("script exhausted".to_string()))
    }
}

fn make_state(replies: Vec<String>, catalog: MarketCatalog) -> AppState {
    let llm: Arc<dyn TextGenerator> = Arc::new(ScriptedModel::new(replies));
    let catalog = Arc::new(catalog);

    let resolver = IntentResolver::new(Arc::clone(&llm), Arc::clone(&catalog));
    let market = MarketDataClient::new(catalog, MarketDataConfig::default());
    let summarizer = Summarizer::new(llm);

    AppState {
        pipeline: Arc::new(QueryPipeline::new(resolver, market, summarizer)),
    }
}

fn catalog_for(server: &mockito::Server) -> MarketCatalog {
    MarketCatalog {
        stock_endpoint: format!("{}/api/realtime/worldstock/stock", server.url()),
        crypto_endpoint: format!("{}/front-api/realTime/crypto", server.url()),
    }
}

async fn spawn_gateway(state: AppState) -> String {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn stock_query_end_to_end() {
    let mut downstream = mockito::Server::new_async().await;
    let quote = downstream
        .mock("GET", "/api/realtime/worldstock/stock/TSLA.O")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"price": 250.1}"#)
        .create_async()
        .await;

    let catalog = catalog_for(&downstream);
    let intent = format!(
        "```json\n{{\"selected_url\": \"{}\", \"selected_http_method\": \"GET\", \"ticker\": \"TSLA.O\", \"reason\": \"stock price request for Tesla\"}}\n```",
        catalog.stock_endpoint
    );
    let state = make_state(
        vec![intent, "Tesla is trading at 250.1 USD.".to_string()],
        catalog,
    );

    let base = spawn_gateway(state).await;
    let resp = reqwest::Client::new()
        .post(&base)
        .body("테슬라 주가 알려줘")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let answer = resp.text().await.unwrap();
    assert!(answer.contains("250.1"));
    quote.assert_async().await;
}

#[tokio::test]
async fn crypto_query_posts_the_ticker_list() {
    let mut downstream = mockito::Server::new_async().await;
    let quote = downstream
        .mock("POST", "/front-api/realTime/crypto")
        .match_body(mockito::Matcher::Json(
            serde_json::json!({ "fqnfTickers": ["BTC_KRW_UPBIT"] }),
        ))
        .with_status(200)
        .with_body(r#"{"result": {"BTC_KRW_UPBIT": {"tradePrice": 98200000}}}"#)
        .create_async()
        .await;

    let catalog = catalog_for(&downstream);
    let intent = format!(
        "{{\"selected_url\": \"{}\", \"selected_http_method\": \"POST\", \"payload\": {{\"fqnfTickers\": [\"BTC_KRW_UPBIT\"]}}, \"reason\": \"crypto price request for Bitcoin on Upbit\"}}",
        catalog.crypto_endpoint
    );
    let state = make_state(
        vec![intent, "Bitcoin trades at 98,200,000 KRW on Upbit.".to_string()],
        catalog,
    );

    let base = spawn_gateway(state).await;
    let resp = reqwest::Client::new()
        .post(&base)
        .body("비트코인 업비트 가격")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let answer = resp.text().await.unwrap();
    assert!(answer.contains("98,200,000"));
    quote.assert_async().await;
}

#[tokio::test]
async fn malformed_model_output_aborts_before_dispatch() {
    let mut downstream = mockito::Server::new_async().await;
    let quote = downstream
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let state = make_state(
        vec!["{\"selected_url\": \"truncat".to_string()],
        catalog_for(&downstream),
    );

    let base = spawn_gateway(state).await;
    let resp = reqwest::Client::new()
        .post(&base)
        .body("테슬라 주가 알려줘")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 502);
    assert_eq!(resp.text().await.unwrap(), "malformed_model_output");
    quote.assert_async().await;
}

#[tokio::test]
async fn url_outside_the_catalog_is_rejected() {
    let mut downstream = mockito::Server::new_async().await;
    let quote = downstream
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let intent = "{\"selected_url\": \"https://attacker.example.com/quote\", \"selected_http_method\": \"GET\", \"ticker\": \"TSLA.O\", \"reason\": \"r\"}".to_string();
    let state = make_state(vec![intent], catalog_for(&downstream));

    let base = spawn_gateway(state).await;
    let resp = reqwest::Client::new()
        .post(&base)
        .body("테슬라 주가 알려줘")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 502);
    assert_eq!(resp.text().await.unwrap(), "unsupported_target");
    quote.assert_async().await;
}

#[tokio::test]
async fn downstream_failure_surfaces_the_error_code() {
    let mut downstream = mockito::Server::new_async().await;
    let _m = downstream
        .mock("GET", "/api/realtime/worldstock/stock/SMR")
        .with_status(503)
        .create_async()
        .await;

    let catalog = catalog_for(&downstream);
    let intent = format!(
        "{{\"selected_url\": \"{}\", \"selected_http_method\": \"GET\", \"ticker\": \"SMR\", \"reason\": \"r\"}}",
        catalog.stock_endpoint
    );
    let state = make_state(vec![intent], catalog);

    let base = spawn_gateway(state).await;
    let resp = reqwest::Client::new()
        .post(&base)
        .body("뉴스케일파워 주가")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 502);
    assert_eq!(resp.text().await.unwrap(), "downstream_http_error");
}
