//! LINE Messaging API integration.
//!
//! Broadcasts text messages to every friend of the configured bot.
//!
//! API docs: https://developers.line.biz/en/reference/messaging-api/
//! Base URL: https://api.line.me
//! Auth: `Authorization: Bearer {channel access token}`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BotInfo, BroadcastChannel};
use crate::types::BroadcastError;

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct BroadcastRequest<'a> {
    messages: Vec<TextMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

/// Response from `/v2/bot/info`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BotInfoResponse {
    display_name: String,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    basic_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    property: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct LineClient {
    http: Client,
    access_token: SecretString,
    api_base: String,
}

impl LineClient {
    pub fn new(access_token: SecretString, api_base: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for LINE")?;

        Ok(Self {
            http,
            access_token,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }

    /// Flatten LINE's `{message, details[]}` error body into one line.
    fn error_message(raw: &str) -> String {
        match serde_json::from_str::<ErrorResponse>(raw) {
            Ok(err) if !err.message.is_empty() => {
                let details: Vec<String> = err
                    .details
                    .iter()
                    .map(|d| format!("{} ({})", d.message, d.property))
                    .collect();
                if details.is_empty() {
                    err.message
                } else {
                    format!("{} [{}]", err.message, details.join("; "))
                }
            }
            _ => raw.to_string(),
        }
    }

    /// Map a non-success response to a typed error.
    async fn into_error(response: Response) -> BroadcastError {
        let status = response.status();
        let raw = response.text().await.unwrap_or_default();
        let message = Self::error_message(&raw);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BroadcastError::Unauthorized {
                status: status.as_u16(),
                message,
            },
            _ => BroadcastError::Rejected {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl BroadcastChannel for LineClient {
    async fn verify_credentials(&self) -> Result<BotInfo, BroadcastError> {
        let response = self
            .http
            .get(self.url("/v2/bot/info"))
            .header("Authorization", self.bearer())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_error(response).await);
        }

        let info: BotInfoResponse = response.json().await?;
        debug!(user_id = ?info.user_id, basic_id = ?info.basic_id, "LINE bot info received");
        Ok(BotInfo {
            display_name: info.display_name,
            user_id: info.user_id,
        })
    }

    async fn broadcast(&self, texts: &[String]) -> Result<(), BroadcastError> {
        let request = BroadcastRequest {
            messages: texts
                .iter()
                .map(|t| TextMessage { kind: "text", text: t.as_str() })
                .collect(),
        };

        let response = self
            .http
            .post(self.url("/v2/bot/message/broadcast"))
            .header("Authorization", self.bearer())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_error(response).await);
        }

        debug!(messages = texts.len(), "LINE broadcast accepted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
