//! Forecast data providers.
//!
//! Defines the `ForecastSource` trait and the tsukumijima weather client
//! that implements it.

pub mod weather;

use async_trait::async_trait;

use crate::types::{FetchError, ForecastRecord};

/// Abstraction over forecast sources.
///
/// Implementors make one request for a city code and return the
/// normalised forecast for the nearest day, or a typed failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch_forecast(&self, city_code: &str) -> Result<ForecastRecord, FetchError>;
}
