//! Shared types for the forecast notifier.
//!
//! These types form the data model passed between the fetcher, the
//! rain-window selector, the advice generator, the composer and the
//! broadcaster. Nothing here outlives a single run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display sentinel for any forecast field the provider left empty.
pub const UNAVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// Rain buckets
// ---------------------------------------------------------------------------

/// One of the four fixed 6-hour windows the provider reports rain chance for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RainBucket {
    T00_06,
    T06_12,
    T12_18,
    T18_24,
}

impl RainBucket {
    /// Canonical time order. Selection and display iterate in this order.
    pub const ALL: [RainBucket; 4] = [
        RainBucket::T00_06,
        RainBucket::T06_12,
        RainBucket::T12_18,
        RainBucket::T18_24,
    ];

    /// Human-readable label, e.g. `"12-18"`.
    pub fn label(&self) -> &'static str {
        match self {
            RainBucket::T00_06 => "00-06",
            RainBucket::T06_12 => "06-12",
            RainBucket::T12_18 => "12-18",
            RainBucket::T18_24 => "18-24",
        }
    }

    /// Key used by the provider's `chanceOfRain` object.
    pub fn api_key(&self) -> &'static str {
        match self {
            RainBucket::T00_06 => "T00_06",
            RainBucket::T06_12 => "T06_12",
            RainBucket::T12_18 => "T12_18",
            RainBucket::T18_24 => "T18_24",
        }
    }

    fn index(&self) -> usize {
        match self {
            RainBucket::T00_06 => 0,
            RainBucket::T06_12 => 1,
            RainBucket::T12_18 => 2,
            RainBucket::T18_24 => 3,
        }
    }
}

impl fmt::Display for RainBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rain probability for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RainChance {
    /// Percentage, 0–100.
    Percent(u8),
    /// Provider sent its "no data" placeholder.
    Unavailable,
}

impl RainChance {
    /// Parse a raw provider value such as `"30%"`, `"30"` or `"--%"`.
    ///
    /// The `%` suffix is stripped; a remainder that is empty or made only
    /// of `-` is the placeholder. Returns `None` for anything else that is
    /// not an integer in 0..=100.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let value = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

        if value.chars().all(|c| c == '-') {
            return Some(RainChance::Unavailable);
        }

        match value.parse::<u8>() {
            Ok(p) if p <= 100 => Some(RainChance::Percent(p)),
            _ => None,
        }
    }

    /// Value used when comparing buckets. The placeholder counts as 0.
    pub fn for_comparison(&self) -> u8 {
        match self {
            RainChance::Percent(p) => *p,
            RainChance::Unavailable => 0,
        }
    }
}

impl fmt::Display for RainChance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RainChance::Percent(p) => write!(f, "{p}%"),
            RainChance::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

/// Ordered mapping from the four buckets to their rain chance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RainChances([RainChance; 4]);

impl RainChances {
    /// Build from values in canonical bucket order (00-06, 06-12, 12-18, 18-24).
    pub fn new(chances: [RainChance; 4]) -> Self {
        Self(chances)
    }

    /// All four buckets set to the placeholder.
    pub fn unavailable() -> Self {
        Self([RainChance::Unavailable; 4])
    }

    /// Convenience constructor from plain percentages.
    pub fn from_percents(percents: [u8; 4]) -> Self {
        Self(percents.map(RainChance::Percent))
    }

    pub fn get(&self, bucket: RainBucket) -> RainChance {
        self.0[bucket.index()]
    }

    /// Iterate `(bucket, chance)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (RainBucket, RainChance)> + '_ {
        RainBucket::ALL.iter().map(move |b| (*b, self.get(*b)))
    }
}

/// The bucket with the highest rain chance, as chosen by the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakRain {
    pub bucket: RainBucket,
    pub probability: u8,
}

impl fmt::Display for PeakRain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}時 ({}%)", self.bucket, self.probability)
    }
}

// ---------------------------------------------------------------------------
// Temperature
// ---------------------------------------------------------------------------

/// A forecast temperature in whole degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Temperature {
    Celsius(i32),
    Unavailable,
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temperature::Celsius(c) => write!(f, "{c}°C"),
            Temperature::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

// ---------------------------------------------------------------------------
// Forecast record
// ---------------------------------------------------------------------------

/// Normalised forecast for the nearest day.
///
/// Built once per run by the fetcher and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Localised display date, e.g. `2026年10月18日(日)`.
    pub date: String,
    /// Provider's bundle title (region name).
    pub title: Option<String>,
    /// Short sky/precipitation label, e.g. `晴れ`.
    pub weather_description: String,
    pub max_temperature: Temperature,
    pub min_temperature: Temperature,
    pub rain_chances: RainChances,
    /// Wave height text, when the region reports one.
    pub wave: Option<String>,
    /// Derived from `rain_chances` by `strategy::select_peak`.
    pub peak_rain: PeakRain,
}

impl ForecastRecord {
    pub fn title_or_unavailable(&self) -> &str {
        self.title.as_deref().unwrap_or(UNAVAILABLE)
    }

    pub fn wave_or_unavailable(&self) -> &str {
        self.wave.as_deref().unwrap_or(UNAVAILABLE)
    }

    /// A fixed sample forecast for tests.
    #[cfg(test)]
    pub fn sample() -> Self {
        let rain_chances = RainChances::from_percents([0, 10, 40, 20]);
        ForecastRecord {
            date: "2026年10月18日(日)".to_string(),
            title: Some("東京都 東京 の天気".to_string()),
            weather_description: "晴れ".to_string(),
            max_temperature: Temperature::Celsius(25),
            min_temperature: Temperature::Celsius(15),
            rain_chances,
            wave: Some("0.5メートル".to_string()),
            peak_rain: crate::strategy::select_peak(&rain_chances),
        }
    }
}

impl fmt::Display for ForecastRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} | max {} | min {} | peak rain {}",
            self.date,
            self.weather_description,
            self.max_temperature,
            self.min_temperature,
            self.peak_rain,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failure to obtain a usable forecast. Terminal for the run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Weather request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Weather API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed weather response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Weather response missing field: {0}")]
    MissingField(&'static str),

    #[error("Weather response field {field} has unexpected value {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("Unrecognised forecast date: {0:?}")]
    InvalidDate(String),
}

/// Failure of the advice call. Never terminal; degrades to fallback text.
#[derive(Debug, thiserror::Error)]
pub enum AdviceError {
    #[error("Advice request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Advice API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed advice response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Advice prompt blocked: {0}")]
    Blocked(String),

    #[error("Advice response contained no text")]
    EmptyResponse,
}

/// Failure to deliver (or authorise) the broadcast. Terminal, non-crashing.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    #[error("Messaging request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Messaging API rejected credentials (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Messaging API rejected request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Startup configuration problems. The process exits before any network call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Environment variable not set: {0}")]
    MissingEnv(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
