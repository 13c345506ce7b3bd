//! Forecast fetcher.
//!
//! Uses the free tsukumijima weather API (a JSON mirror of the Japan
//! Meteorological Agency's forecasts) for the nearest-day forecast of a
//! single city code.
//!
//! API: `https://weather.tsukumijima.net/api/forecast?city=<code>`
//! Auth: None required.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::ForecastSource;
use crate::strategy::select_peak;
use crate::types::{FetchError, ForecastRecord, RainBucket, RainChance, RainChances, Temperature};

/// Tokyo.
pub const DEFAULT_CITY_CODE: &str = "130010";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    forecasts: Option<Vec<DailyForecast>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyForecast {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    telop: Option<String>,
    #[serde(default)]
    detail: Option<Detail>,
    #[serde(default)]
    temperature: Option<TemperaturePair>,
    #[serde(default)]
    chance_of_rain: Option<HashMap<String, Option<String>>>,
}

#[derive(Debug, Deserialize)]
struct Detail {
    #[serde(default)]
    wave: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TemperaturePair {
    #[serde(default)]
    max: Option<TemperatureValue>,
    #[serde(default)]
    min: Option<TemperatureValue>,
}

#[derive(Debug, Deserialize)]
struct TemperatureValue {
    #[serde(default)]
    celsius: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct WeatherClient {
    http: Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tenki-notify/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build weather HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Turn the raw payload into a `ForecastRecord` for the first (nearest) day.
    fn normalise(resp: ForecastResponse) -> Result<ForecastRecord, FetchError> {
        let day = resp
            .forecasts
            .ok_or(FetchError::MissingField("forecasts"))?
            .into_iter()
            .next()
            .ok_or(FetchError::MissingField("forecasts[0]"))?;

        let raw_date = day.date.ok_or(FetchError::MissingField("forecasts[0].date"))?;
        let date = display_date(&raw_date)?;
        let weather_description = day.telop.ok_or(FetchError::MissingField("forecasts[0].telop"))?;

        let (max_temperature, min_temperature) = match day.temperature {
            Some(t) => (
                parse_temperature("temperature.max.celsius", t.max)?,
                parse_temperature("temperature.min.celsius", t.min)?,
            ),
            None => (Temperature::Unavailable, Temperature::Unavailable),
        };

        let chance_of_rain = day
            .chance_of_rain
            .ok_or(FetchError::MissingField("forecasts[0].chanceOfRain"))?;
        let rain_chances = parse_rain_chances(&chance_of_rain)?;

        let wave = day
            .detail
            .and_then(|d| d.wave)
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty());

        Ok(ForecastRecord {
            date,
            title: resp.title.filter(|t| !t.trim().is_empty()),
            weather_description,
            max_temperature,
            min_temperature,
            rain_chances,
            wave,
            peak_rain: select_peak(&rain_chances),
        })
    }
}

#[async_trait]
impl ForecastSource for WeatherClient {
    async fn fetch_forecast(&self, city_code: &str) -> Result<ForecastRecord, FetchError> {
        debug!(city_code, url = %self.base_url, "Requesting forecast");

        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("city", city_code)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let parsed: ForecastResponse = serde_json::from_str(&body)?;
        let record = Self::normalise(parsed)?;

        info!(
            city_code,
            date = %record.date,
            weather = %record.weather_description,
            peak_bucket = %record.peak_rain.bucket,
            peak_probability = record.peak_rain.probability,
            "Forecast fetched"
        );
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Normalisation helpers
// ---------------------------------------------------------------------------

/// `2026-10-18` → `2026年10月18日(日)`.
fn display_date(raw: &str) -> Result<String, FetchError> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| FetchError::InvalidDate(raw.to_string()))?;
    let weekday = match date.weekday() {
        Weekday::Mon => "月",
        Weekday::Tue => "火",
        Weekday::Wed => "水",
        Weekday::Thu => "木",
        Weekday::Fri => "金",
        Weekday::Sat => "土",
        Weekday::Sun => "日",
    };
    Ok(format!(
        "{}年{}月{}日({weekday})",
        date.year(),
        date.month(),
        date.day()
    ))
}

fn parse_temperature(
    field: &'static str,
    value: Option<TemperatureValue>,
) -> Result<Temperature, FetchError> {
    match value.and_then(|v| v.celsius) {
        None => Ok(Temperature::Unavailable),
        Some(raw) => raw
            .trim()
            .parse::<i32>()
            .map(Temperature::Celsius)
            .map_err(|_| FetchError::InvalidField { field, value: raw }),
    }
}

/// A missing bucket key is structural; a null bucket is the placeholder.
fn parse_rain_chances(
    raw: &HashMap<String, Option<String>>,
) -> Result<RainChances, FetchError> {
    let mut chances = [RainChance::Unavailable; 4];
    for (slot, bucket) in chances.iter_mut().zip(RainBucket::ALL) {
        let value = raw
            .get(bucket.api_key())
            .ok_or(FetchError::MissingField(bucket.api_key()))?;
        *slot = match value {
            None => RainChance::Unavailable,
            Some(s) => RainChance::parse(s).ok_or_else(|| FetchError::InvalidField {
                field: bucket.api_key(),
                value: s.clone(),
            })?,
        };
    }
    Ok(RainChances::new(chances))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
