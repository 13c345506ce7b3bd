//! End-to-end pipeline scenarios.
//!
//! The first group drives `Pipeline` with in-memory doubles; the second
//! wires the real HTTP clients to wiremock servers.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tenki_notify::data::weather::WeatherClient;
use tenki_notify::engine::composer::compose_message;
use tenki_notify::engine::pipeline::{Outcome, Pipeline, Stage};
use tenki_notify::llm::gemini::GeminiClient;
use tenki_notify::llm::FALLBACK_ADVICE;
use tenki_notify::platforms::line::LineClient;
use tenki_notify::types::{BroadcastError, FetchError};

use crate::mocks::{sample_forecast, FixedAdvice, FixedForecast, RecordingChannel};

const ADVICE: &str = "軽装で大丈夫です。";

// ---------------------------------------------------------------------------
// In-memory doubles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_end_to_end_single_message() {
    let channel = RecordingChannel::new();
    let forecasts = FixedForecast::ok();
    let requested = forecasts.calls();

    let report = Pipeline::new(
        Box::new(forecasts),
        Box::new(FixedAdvice::new(Some(ADVICE))),
        Box::new(channel.clone()),
    )
    .run()
    .await;

    let expected = compose_message(&sample_forecast(), ADVICE);
    assert_eq!(report.stage, Stage::Sent);
    assert_eq!(channel.sent(), vec![vec![expected]]);
    assert_eq!(channel.verify_calls(), 1);
    assert_eq!(*requested.lock().unwrap(), vec!["130010".to_string()]);
}

#[tokio::test]
async fn test_fetch_failure_never_broadcasts() {
    let channel = RecordingChannel::new();
    let advice = FixedAdvice::new(Some(ADVICE));
    let prompts = advice.prompts();

    let report = Pipeline::new(
        Box::new(FixedForecast::failing()),
        Box::new(advice),
        Box::new(channel.clone()),
    )
    .run()
    .await;

    assert!(matches!(report.outcome, Outcome::FetchFailed(FetchError::Status { status: 500, .. })));
    assert!(channel.sent().is_empty());
    assert_eq!(channel.verify_calls(), 0);
    assert!(prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_advice_failure_still_broadcasts_fallback() {
    let channel = RecordingChannel::new();

    let report = Pipeline::new(
        Box::new(FixedForecast::ok()),
        Box::new(FixedAdvice::new(None)),
        Box::new(channel.clone()),
    )
    .run()
    .await;

    assert!(report.advice_fallback);
    assert_eq!(report.stage, Stage::Sent);
    let sent = channel.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0][0], compose_message(&sample_forecast(), FALLBACK_ADVICE));
}

#[tokio::test]
async fn test_broadcast_rejection_completes_run() {
    let channel = RecordingChannel::rejecting_broadcast();

    let report = Pipeline::new(
        Box::new(FixedForecast::ok()),
        Box::new(FixedAdvice::new(Some(ADVICE))),
        Box::new(channel.clone()),
    )
    .run()
    .await;

    assert_eq!(report.stage, Stage::Composed);
    assert!(matches!(
        report.outcome,
        Outcome::BroadcastFailed(BroadcastError::Unauthorized { status: 401, .. })
    ));
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn test_rejected_credentials_gate_broadcast() {
    let channel = RecordingChannel::rejecting_credentials();

    let report = Pipeline::new(
        Box::new(FixedForecast::ok()),
        Box::new(FixedAdvice::new(Some(ADVICE))),
        Box::new(channel.clone()),
    )
    .run()
    .await;

    assert!(matches!(report.outcome, Outcome::CredentialsRejected));
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn test_prompt_carries_peak_window() {
    let advice = FixedAdvice::new(Some(ADVICE));
    let prompts = advice.prompts();

    Pipeline::new(
        Box::new(FixedForecast::ok()),
        Box::new(advice),
        Box::new(RecordingChannel::new()),
    )
    .run()
    .await;

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("12-18時"));
    assert!(prompts[0].contains("40%"));
}

// ---------------------------------------------------------------------------
// Real clients against wiremock
// ---------------------------------------------------------------------------

fn forecast_payload() -> serde_json::Value {
    json!({
        "title": "東京都 東京 の天気",
        "forecasts": [{
            "date": "2026-10-18",
            "telop": "晴れ",
            "detail": { "wave": "0.5メートル" },
            "temperature": { "min": { "celsius": "15" }, "max": { "celsius": "25" } },
            "chanceOfRain": { "T00_06": "--%", "T06_12": "10%", "T12_18": "40%", "T18_24": "40%" }
        }]
    })
}

fn http_pipeline(server: &MockServer) -> Pipeline {
    let weather = WeatherClient::new(
        &format!("{}/api/forecast", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();
    let gemini = GeminiClient::new(
        SecretString::new("gemini-key".to_string()),
        &server.uri(),
        "gemini-2.0-flash",
        Duration::from_secs(5),
    )
    .unwrap();
    let line = LineClient::new(
        SecretString::new("line-token".to_string()),
        &server.uri(),
        Duration::from_secs(5),
    )
    .unwrap();
    Pipeline::new(Box::new(weather), Box::new(gemini), Box::new(line))
}

async fn mount_bot_info(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2/bot/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userId": "U0001",
            "displayName": "天気ボット"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_http_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/forecast"))
        .and(query_param("city", "130010"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_payload()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": ADVICE }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    mount_bot_info(&server).await;

    let expected = compose_message(&sample_forecast(), ADVICE);
    Mock::given(method("POST"))
        .and(path("/v2/bot/message/broadcast"))
        .and(body_json(json!({
            "messages": [{ "type": "text", "text": expected }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let report = http_pipeline(&server).run().await;
    assert_eq!(report.stage, Stage::Sent);
    assert_eq!(report.message.as_deref(), Some(expected.as_str()));
}

#[tokio::test]
async fn test_http_weather_500_never_broadcasts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/bot/message/broadcast"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = http_pipeline(&server).run().await;
    assert_eq!(report.stage, Stage::Start);
    assert!(matches!(report.outcome, Outcome::FetchFailed(_)));
}

#[tokio::test]
async fn test_http_malformed_forecast_never_broadcasts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "x" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = http_pipeline(&server).run().await;
    assert!(matches!(
        report.outcome,
        Outcome::FetchFailed(FetchError::MissingField("forecasts"))
    ));
}

#[tokio::test]
async fn test_http_gemini_error_and_line_401() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_payload()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    mount_bot_info(&server).await;

    Mock::given(method("POST"))
        .and(path("/v2/bot/message/broadcast"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Authentication failed." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let report = http_pipeline(&server).run().await;
    assert!(report.advice_fallback);
    assert!(report
        .message
        .as_deref()
        .is_some_and(|m| m.ends_with(FALLBACK_ADVICE)));
    assert!(matches!(
        report.outcome,
        Outcome::BroadcastFailed(BroadcastError::Unauthorized { status: 401, .. })
    ));
}
