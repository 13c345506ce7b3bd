//! Deterministic provider doubles for integration testing.
//!
//! A fixed forecast source, a fixed advice model, and a recording
//! broadcast channel. All state is in-memory and shared through `Arc`s so
//! tests can inspect it after the pipeline has taken ownership.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tenki_notify::data::ForecastSource;
use tenki_notify::llm::AdviceModel;
use tenki_notify::platforms::{BotInfo, BroadcastChannel};
use tenki_notify::strategy::select_peak;
use tenki_notify::types::*;

/// The fixed sample forecast: sunny, 25/15°C, peak rain 12-18 at 40%.
pub fn sample_forecast() -> ForecastRecord {
    let rain_chances = RainChances::new([
        RainChance::Unavailable,
        RainChance::Percent(10),
        RainChance::Percent(40),
        RainChance::Percent(40),
    ]);
    ForecastRecord {
        date: "2026年10月18日(日)".to_string(),
        title: Some("東京都 東京 の天気".to_string()),
        weather_description: "晴れ".to_string(),
        max_temperature: Temperature::Celsius(25),
        min_temperature: Temperature::Celsius(15),
        rain_chances,
        wave: Some("0.5メートル".to_string()),
        peak_rain: select_peak(&rain_chances),
    }
}

// ---------------------------------------------------------------------------
// Forecast source
// ---------------------------------------------------------------------------

/// Returns the sample forecast, or a 500 status error when `failing`.
pub struct FixedForecast {
    failing: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FixedForecast {
    pub fn ok() -> Self {
        Self { failing: false, calls: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn failing() -> Self {
        Self { failing: true, calls: Arc::new(Mutex::new(Vec::new())) }
    }

    /// City codes requested so far.
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ForecastSource for FixedForecast {
    async fn fetch_forecast(&self, city_code: &str) -> Result<ForecastRecord, FetchError> {
        self.calls.lock().unwrap().push(city_code.to_string());
        if self.failing {
            return Err(FetchError::Status { status: 500, body: "Internal Server Error".into() });
        }
        Ok(sample_forecast())
    }
}

// ---------------------------------------------------------------------------
// Advice model
// ---------------------------------------------------------------------------

/// Returns fixed text, or an error when constructed with `None`.
pub struct FixedAdvice {
    text: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl FixedAdvice {
    pub fn new(text: Option<&str>) -> Self {
        Self { text: text.map(str::to_string), prompts: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

#[async_trait]
impl AdviceModel for FixedAdvice {
    async fn complete(&self, prompt: &str) -> Result<String, AdviceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.text.clone().ok_or(AdviceError::Status { status: 503, body: "overloaded".into() })
    }
}

// ---------------------------------------------------------------------------
// Broadcast channel
// ---------------------------------------------------------------------------

/// Records every broadcast request it receives.
#[derive(Clone, Default)]
pub struct RecordingChannel {
    sent: Arc<Mutex<Vec<Vec<String>>>>,
    verify_calls: Arc<Mutex<u32>>,
    /// If set, `broadcast` fails with an authorization error.
    reject_broadcast: bool,
    /// If set, `verify_credentials` fails.
    reject_credentials: bool,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_broadcast() -> Self {
        Self { reject_broadcast: true, ..Self::default() }
    }

    pub fn rejecting_credentials() -> Self {
        Self { reject_credentials: true, ..Self::default() }
    }

    /// All broadcast requests recorded so far (one `Vec` per request).
    pub fn sent(&self) -> Vec<Vec<String>> {
        self.sent.lock().unwrap().clone()
    }

    pub fn verify_calls(&self) -> u32 {
        *self.verify_calls.lock().unwrap()
    }
}

#[async_trait]
impl BroadcastChannel for RecordingChannel {
    async fn verify_credentials(&self) -> Result<BotInfo, BroadcastError> {
        *self.verify_calls.lock().unwrap() += 1;
        if self.reject_credentials {
            return Err(BroadcastError::Unauthorized { status: 401, message: "invalid token".into() });
        }
        Ok(BotInfo { display_name: "天気ボット".into(), user_id: Some("U0001".into()) })
    }

    async fn broadcast(&self, texts: &[String]) -> Result<(), BroadcastError> {
        if self.reject_broadcast {
            return Err(BroadcastError::Unauthorized {
                status: 401,
                message: "Authentication failed.".into(),
            });
        }
        self.sent.lock().unwrap().push(texts.to_vec());
        Ok(())
    }
}
