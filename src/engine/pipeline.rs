//! Run orchestrator.
//!
//! Sequences fetch → advise → compose → broadcast exactly once. Each
//! stage gates the next:
//!
//! - a fetch failure ends the run before any advice or broadcast call;
//! - an advice failure degrades to fallback text and the run continues;
//! - a credential or broadcast failure ends the run without a retry.
//!
//! No error escapes `Pipeline::run`; the returned `RunReport` says how far
//! the run got and why it stopped.

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::data::weather::DEFAULT_CITY_CODE;
use crate::data::ForecastSource;
use crate::engine::composer::compose_message;
use crate::llm::{self, AdviceModel, FALLBACK_ADVICE};
use crate::platforms::{self, BroadcastChannel};
use crate::types::{BroadcastError, FetchError, ForecastRecord};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Last stage a run completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    Fetched,
    Advised,
    Composed,
    Sent,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Start => "START",
            Stage::Fetched => "FETCHED",
            Stage::Advised => "ADVISED",
            Stage::Composed => "COMPOSED",
            Stage::Sent => "SENT",
        };
        f.write_str(s)
    }
}

/// Why a run stopped.
#[derive(Debug)]
pub enum Outcome {
    Sent,
    FetchFailed(FetchError),
    CredentialsRejected,
    BroadcastFailed(BroadcastError),
}

impl Outcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Outcome::Sent)
    }
}

/// Summary of a single run.
#[derive(Debug)]
pub struct RunReport {
    pub city_code: String,
    pub stage: Stage,
    pub outcome: Outcome,
    pub forecast: Option<ForecastRecord>,
    /// True when the advice call failed and the fallback text was used.
    pub advice_fallback: bool,
    /// The composed broadcast text, once composition was reached.
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Holds the three provider clients for one run.
///
/// Clients are built once during setup and injected here, so tests can
/// substitute any of them.
pub struct Pipeline {
    forecasts: Box<dyn ForecastSource>,
    advisor: Box<dyn AdviceModel>,
    channel: Box<dyn BroadcastChannel>,
    city_code: String,
    verify_credentials: bool,
}

impl Pipeline {
    pub fn new(
        forecasts: Box<dyn ForecastSource>,
        advisor: Box<dyn AdviceModel>,
        channel: Box<dyn BroadcastChannel>,
    ) -> Self {
        Self {
            forecasts,
            advisor,
            channel,
            city_code: DEFAULT_CITY_CODE.to_string(),
            verify_credentials: true,
        }
    }

    pub fn with_city_code(mut self, city_code: impl Into<String>) -> Self {
        self.city_code = city_code.into();
        self
    }

    /// Enable or disable the bot-info check before broadcasting.
    pub fn with_credential_check(mut self, enabled: bool) -> Self {
        self.verify_credentials = enabled;
        self
    }

    /// Run fetch → advise → compose → broadcast once.
    pub async fn run(&self) -> RunReport {
        info!(city_code = %self.city_code, "Starting forecast run");

        let mut report = RunReport {
            city_code: self.city_code.clone(),
            stage: Stage::Start,
            outcome: Outcome::Sent,
            forecast: None,
            advice_fallback: false,
            message: None,
        };

        // 1. Fetch
        let forecast = match self.forecasts.fetch_forecast(&self.city_code).await {
            Ok(f) => f,
            Err(e) => {
                error!(city_code = %self.city_code, error = %e, "Forecast fetch failed, nothing will be sent");
                report.outcome = Outcome::FetchFailed(e);
                return report;
            }
        };
        debug!(forecast = %forecast, "Forecast normalised");
        report.stage = Stage::Fetched;

        // 2. Advise (best effort)
        let advice = match llm::try_generate_advice(self.advisor.as_ref(), &forecast).await {
            Ok(a) => a,
            Err(e) => {
                warn!(error = %e, "Advice generation failed, using fallback text");
                report.advice_fallback = true;
                FALLBACK_ADVICE.to_string()
            }
        };
        report.stage = Stage::Advised;

        // 3. Compose
        let message = compose_message(&forecast, &advice);
        report.forecast = Some(forecast);
        report.stage = Stage::Composed;

        // 4. Broadcast
        if self.verify_credentials && !platforms::verify_credentials(self.channel.as_ref()).await {
            warn!("Skipping broadcast: messaging credentials were not accepted");
            report.outcome = Outcome::CredentialsRejected;
            report.message = Some(message);
            return report;
        }

        match platforms::broadcast(self.channel.as_ref(), &message).await {
            Ok(()) => {
                report.stage = Stage::Sent;
                report.outcome = Outcome::Sent;
            }
            Err(e) => {
                error!(error = %e, "Broadcast failed, no message was delivered");
                report.outcome = Outcome::BroadcastFailed(e);
            }
        }
        report.message = Some(message);
        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
