//! Broadcast message rendering.
//!
//! Pure formatting of a forecast and its advice into the fixed
//! multi-line template. Every field is always rendered; missing values
//! show the `N/A` sentinel.

use crate::types::ForecastRecord;

/// Render the final broadcast text.
pub fn compose_message(forecast: &ForecastRecord, advice: &str) -> String {
    format!(
        "今日の天気をお知らせします。\n\
         {title}\n\
         日付: {date}\n\
         天気: {weather}\n\
         最高気温: {max}\n\
         最低気温: {min}\n\
         降水確率が最も高い時間帯: {peak}\n\
         波の高さ: {wave}\n\
         \n\
         [服装アドバイス]\n\
         {advice}",
        title = forecast.title_or_unavailable(),
        date = forecast.date,
        weather = forecast.weather_description,
        max = forecast.max_temperature,
        min = forecast.min_temperature,
        peak = forecast.peak_rain,
        wave = forecast.wave_or_unavailable(),
    )
}
