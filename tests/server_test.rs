use anyhow::Result;
use autoprice::app::cors::CorsPolicy;
use autoprice::{AppState, ServiceConfig};
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tempfile::TempDir;
use tokio::net::TcpListener;

const ORIGIN: &str = "http://localhost:5173";

/// Writes a complete artifact set: a two-stump forest that prices on make and mileage.
fn write_artifacts(dir: &TempDir) -> Result<()> {
    let write = |name: &str, value: Value| std::fs::write(dir.path().join(name), value.to_string());

    write(
        "label_encoders.json",
        json!({
            "make": ["honda", "toyota"],
            "model": ["civic", "corolla"],
            "trim": ["ex", "le"],
            "body_type": ["sedan", "suv"],
            "drivetrain": ["awd", "fwd"],
            "transmission": ["automatic", "manual"]
        }),
    )?;
    write(
        "scaler.json",
        json!({"kind": "standard", "mean": [50000.0, 5.0, 2.0], "scale": [10000.0, 2.0, 0.5]}),
    )?;
    write(
        "feature_order.json",
        json!(["miles", "car_age", "engine_size", "make", "model", "trim",
               "body_type", "drivetrain", "transmission"]),
    )?;
    // tree 0 splits on scaled miles (column 0), tree 1 on make code (column 3)
    write(
        "model.json",
        json!({
            "kind": "tree_ensemble",
            "n_features": 9,
            "aggregation": "mean",
            "trees": [
                {"children_left": [1, -1, -1], "children_right": [2, -1, -1],
                 "feature": [0, -2, -2], "threshold": [0.0, -2.0, -2.0],
                 "value": [0.0, 24690.0, 15000.0]},
                {"children_left": [1, -1, -1], "children_right": [2, -1, -1],
                 "feature": [3, -2, -2], "threshold": [0.5, -2.0, -2.0],
                 "value": [0.0, 18000.0, 21000.0]}
            ]
        }),
    )?;
    Ok(())
}

struct TestServer {
    addr: SocketAddr,
    _artifacts: TempDir,
}

impl TestServer {
    async fn start(news_endpoint: String, api_key_env: &str) -> Result<Self> {
        let artifacts = TempDir::new()?;
        write_artifacts(&artifacts)?;

        let mut config = ServiceConfig::default();
        config.artifacts.dir = artifacts.path().to_path_buf();
        config.news.endpoint = news_endpoint;
        config.news.api_key_env = api_key_env.to_string();
        config.news.timeout_seconds = 2;

        let state = AppState::from_config(&config).await?;
        let app = autoprice::router(state, CorsPolicy::new(ORIGIN));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = autoprice::serve(listener, app, std::future::pending()).await;
        });

        Ok(Self {
            addr,
            _artifacts: artifacts,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

fn corolla() -> Value {
    json!({
        "make": "toyota",
        "model": "corolla",
        "trim": "le",
        "body_type": "sedan",
        "drivetrain": "fwd",
        "transmission": "automatic",
        "miles": 42000,
        "car_age": 4,
        "engine_size": 1.8
    })
}

#[tokio::test]
async fn test_predict_returns_rounded_price() -> Result<()> {
    let server = TestServer::start("http://127.0.0.1:9/news".to_string(), "AUTOPRICE_IT_KEY_1").await?;
    let client = reqwest::Client::new();

    let response = client.post(server.url("/predict")).json(&corolla()).send().await?;
    assert_eq!(response.status(), 200);
    // low mileage (24690) and toyota (21000): mean 22845 rounds to 22800
    let body: Value = response.json().await?;
    assert_eq!(body, json!({"predicted_price": 22800.0}));
    Ok(())
}

#[tokio::test]
async fn test_predict_unknown_make_uses_sentinel() -> Result<()> {
    let server = TestServer::start("http://127.0.0.1:9/news".to_string(), "AUTOPRICE_IT_KEY_2").await?;
    let client = reqwest::Client::new();

    let mut vehicle = corolla();
    vehicle["make"] = json!("ferrari");
    vehicle["miles"] = json!(90000);

    let body: Value = client
        .post(server.url("/predict"))
        .json(&vehicle)
        .send()
        .await?
        .json()
        .await?;
    // high mileage (15000) and sentinel make -1 <= 0.5 (18000)
    assert_eq!(body, json!({"predicted_price": 16500.0}));
    Ok(())
}

#[tokio::test]
async fn test_predict_errors_are_reported_in_body() -> Result<()> {
    let server = TestServer::start("http://127.0.0.1:9/news".to_string(), "AUTOPRICE_IT_KEY_3").await?;
    let client = reqwest::Client::new();

    let mut negative = corolla();
    negative["miles"] = json!(-1);

    for body in [
        "not json".to_string(),
        json!({"make": "toyota"}).to_string(),
        negative.to_string(),
    ] {
        let response = client
            .post(server.url("/predict"))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;
        assert_eq!(response.status(), 200);

        let value: Value = response.json().await?;
        let error = value["error"].as_str().unwrap_or_default();
        assert!(error.starts_with("Validation error"), "unexpected: {}", value);
    }
    Ok(())
}

#[tokio::test]
async fn test_oversized_body_is_reported_in_body() -> Result<()> {
    let server = TestServer::start("http://127.0.0.1:9/news".to_string(), "AUTOPRICE_IT_KEY_8").await?;
    let client = reqwest::Client::new();

    // past axum's 2 MB default body limit
    let mut vehicle = corolla();
    vehicle["pad"] = json!("x".repeat(3 * 1024 * 1024));

    let response = client.post(server.url("/predict")).json(&vehicle).send().await?;
    assert_eq!(response.status(), 200);

    let value: Value = response.json().await?;
    let error = value["error"].as_str().unwrap_or_default();
    assert!(error.starts_with("Validation error"), "unexpected: {}", value);
    assert!(error.contains("length limit exceeded"), "unexpected: {}", value);
    Ok(())
}

#[tokio::test]
async fn test_news_is_deduplicated() -> Result<()> {
    std::env::set_var("AUTOPRICE_IT_KEY_4", "it-key");
    let provider = MockServer::start();
    let provider_mock = provider.mock(|when, then| {
        when.method(GET)
            .path("/api/1/news")
            .query_param("apikey", "it-key")
            .query_param("language", "en");
        then.status(200).json_body(json!({
            "status": "success",
            "results": [
                {"title": "Hybrid sales surge", "link": "http://x/1", "description": "Dealers report"},
                {"title": "Another take", "link": "http://x/1", "description": "Different"},
                {"title": "", "link": "http://x/2", "description": "No title"},
                {"title": "Recall widens", "link": "http://x/3", "description": "Airbags"}
            ]
        }));
    });

    let server = TestServer::start(provider.url("/api/1/news"), "AUTOPRICE_IT_KEY_4").await?;
    let body: Value = reqwest::get(server.url("/news")).await?.json().await?;

    provider_mock.assert();
    let titles: Vec<&str> = body["results"]
        .as_array()
        .map(|a| a.iter().filter_map(|x| x["title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, vec!["Hybrid sales surge", "Recall widens"]);
    assert_eq!(body["results"][0]["link"], "http://x/1");
    Ok(())
}

#[tokio::test]
async fn test_news_provider_failure() -> Result<()> {
    std::env::set_var("AUTOPRICE_IT_KEY_5", "it-key");
    let provider = MockServer::start();
    provider.mock(|when, then| {
        when.method(GET).path("/api/1/news");
        then.status(503);
    });

    let server = TestServer::start(provider.url("/api/1/news"), "AUTOPRICE_IT_KEY_5").await?;
    let response = reqwest::get(server.url("/news")).await?;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await?;
    assert_eq!(body, json!({"error": "Failed to fetch news, status code: 503"}));
    Ok(())
}

#[tokio::test]
async fn test_news_without_api_key() -> Result<()> {
    let server = TestServer::start("http://127.0.0.1:9/news".to_string(), "AUTOPRICE_IT_KEY_UNSET").await?;
    let body: Value = reqwest::get(server.url("/news")).await?.json().await?;
    assert_eq!(
        body,
        json!({"error": "Configuration error: news API key is not configured"})
    );
    Ok(())
}

#[tokio::test]
async fn test_cors_preflight_and_simple_requests() -> Result<()> {
    let server = TestServer::start("http://127.0.0.1:9/news".to_string(), "AUTOPRICE_IT_KEY_6").await?;
    let client = reqwest::Client::new();

    let preflight = client
        .request(reqwest::Method::OPTIONS, server.url("/predict"))
        .header("Origin", ORIGIN)
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await?;
    assert_eq!(preflight.status(), 200);
    assert_eq!(preflight.headers()["access-control-allow-origin"], ORIGIN);
    assert_eq!(preflight.headers()["access-control-allow-credentials"], "true");
    assert_eq!(preflight.headers()["access-control-allow-headers"], "content-type");

    let rejected = client
        .request(reqwest::Method::OPTIONS, server.url("/predict"))
        .header("Origin", "http://evil.example")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await?;
    assert_eq!(rejected.status(), 400);

    let simple = client
        .post(server.url("/predict"))
        .header("Origin", ORIGIN)
        .json(&corolla())
        .send()
        .await?;
    assert_eq!(simple.headers()["access-control-allow-origin"], ORIGIN);

    let foreign = client
        .post(server.url("/predict"))
        .header("Origin", "http://evil.example")
        .json(&corolla())
        .send()
        .await?;
    assert!(foreign.headers().get("access-control-allow-origin").is_none());
    Ok(())
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let server = TestServer::start("http://127.0.0.1:9/news".to_string(), "AUTOPRICE_IT_KEY_7").await?;
    let response = reqwest::get(server.url("/health")).await?;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await?, "OK");
    Ok(())
}

#[tokio::test]
async fn test_startup_fails_without_artifacts() -> Result<()> {
    let empty = TempDir::new()?;
    let mut config = ServiceConfig::default();
    config.artifacts.dir = empty.path().to_path_buf();

    match AppState::from_config(&config).await {
        Ok(_) => panic!("expected artifact loading to fail"),
        Err(e) => assert!(e.is_fatal()),
    }
    Ok(())
}
