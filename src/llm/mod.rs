//! Clothing and umbrella advice from a generative-text model.
//!
//! Defines the `AdviceModel` trait, the fixed prompt template and the
//! best-effort `generate_advice` entry point. The Gemini client lives in
//! `gemini`.

pub mod gemini;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::types::{AdviceError, ForecastRecord};

/// Substituted when the model call fails for any reason.
pub const FALLBACK_ADVICE: &str = "アドバイスを取得できませんでした。";

/// Abstraction over single-shot text generation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdviceModel: Send + Sync {
    /// Send one prompt and return the model's text verbatim.
    async fn complete(&self, prompt: &str) -> Result<String, AdviceError>;
}

/// Build the advice prompt for a forecast.
pub fn build_prompt(forecast: &ForecastRecord) -> String {
    format!(
        "今日の天気情報は以下の通りです：\n\
         - 天気: {}\n\
         - 最高気温: {}\n\
         - 最低気温: {}\n\
         - 降水確率が最も高い時間帯: {}時\n\
         - その時間帯の降水確率: {}%\n\
         \n\
         この天気に適した服装のアドバイスと、傘が必要かどうかを3行程度で教えてください。",
        forecast.weather_description,
        forecast.max_temperature,
        forecast.min_temperature,
        forecast.peak_rain.bucket,
        forecast.peak_rain.probability,
    )
}

/// Ask the model for advice, surfacing the failure to the caller.
pub async fn try_generate_advice(
    model: &dyn AdviceModel,
    forecast: &ForecastRecord,
) -> Result<String, AdviceError> {
    let prompt = build_prompt(forecast);
    let advice = model.complete(&prompt).await?;
    info!(chars = advice.chars().count(), "Advice generated");
    Ok(advice)
}

/// Ask the model for advice; any failure degrades to [`FALLBACK_ADVICE`].
pub async fn generate_advice(model: &dyn AdviceModel, forecast: &ForecastRecord) -> String {
    match try_generate_advice(model, forecast).await {
        Ok(advice) => advice,
        Err(e) => {
            warn!(error = %e, "Advice generation failed, using fallback text");
            FALLBACK_ADVICE.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
