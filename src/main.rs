//! tenki-notify — daily forecast broadcaster
//!
//! Entry point. Loads configuration, initialises structured logging,
//! resolves credentials (failing fast if any are missing), builds the
//! provider clients and performs exactly one fetch → advise → send run.
//! Meant to be invoked once per tick by an external scheduler.

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use tenki_notify::config::{self, AppConfig};
use tenki_notify::data::weather::WeatherClient;
use tenki_notify::engine::pipeline::{Outcome, Pipeline, RunReport};
use tenki_notify::llm::gemini::GeminiClient;
use tenki_notify::platforms::line::LineClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load(config::DEFAULT_CONFIG_PATH)?;

    init_logging();

    // Credentials are required before any network call.
    let gemini_key = AppConfig::resolve_secret(&cfg.llm.api_key_env)?;
    let line_token = AppConfig::resolve_secret(&cfg.messaging.access_token_env)?;

    info!(
        city_code = %cfg.weather.city_code,
        model = %cfg.llm.model,
        verify_credentials = cfg.messaging.verify_credentials,
        "tenki-notify starting"
    );

    // -- Initialise components -------------------------------------------

    let weather = WeatherClient::new(
        &cfg.weather.base_url,
        Duration::from_secs(cfg.weather.timeout_secs),
    )?;

    let gemini = GeminiClient::new(
        gemini_key,
        &cfg.llm.base_url,
        &cfg.llm.model,
        Duration::from_secs(cfg.llm.timeout_secs),
    )?;

    let line = LineClient::new(
        line_token,
        &cfg.messaging.api_base,
        Duration::from_secs(cfg.messaging.timeout_secs),
    )?;

    let pipeline = Pipeline::new(Box::new(weather), Box::new(gemini), Box::new(line))
        .with_city_code(cfg.weather.city_code.clone())
        .with_credential_check(cfg.messaging.verify_credentials);

    // -- Single run --------------------------------------------------------

    let report = pipeline.run().await;
    log_run_report(&report);

    Ok(())
}

/// Log a one-line run summary.
fn log_run_report(report: &RunReport) {
    let outcome = match &report.outcome {
        Outcome::Sent => "sent".to_string(),
        Outcome::FetchFailed(e) => format!("fetch failed: {e}"),
        Outcome::CredentialsRejected => "credentials rejected".to_string(),
        Outcome::BroadcastFailed(e) => format!("broadcast failed: {e}"),
    };
    info!(
        city_code = %report.city_code,
        stage = %report.stage,
        advice_fallback = report.advice_fallback,
        message_chars = report.message.as_ref().map(|m| m.chars().count()).unwrap_or(0),
        outcome = %outcome,
        "Run complete"
    );
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tenki_notify=info"));

    let json_logging = std::env::var("TENKI_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
