//! Messaging platform integrations.
//!
//! Defines the `BroadcastChannel` trait and the LINE client that
//! implements it, plus the two operations the pipeline uses:
//! a credential check and a single-message broadcast.

pub mod line;

use async_trait::async_trait;
use tracing::{error, info};

use crate::types::BroadcastError;

/// Identity of the bot behind a channel access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotInfo {
    pub display_name: String,
    pub user_id: Option<String>,
}

/// Abstraction over channels that fan a message out to all subscribers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BroadcastChannel: Send + Sync {
    /// Look up the bot identity for the configured credentials.
    async fn verify_credentials(&self) -> Result<BotInfo, BroadcastError>;

    /// Deliver the given text messages, in order, to every subscriber.
    async fn broadcast(&self, texts: &[String]) -> Result<(), BroadcastError>;
}

/// Check the channel credentials, logging the bot's display name.
pub async fn verify_credentials(channel: &dyn BroadcastChannel) -> bool {
    match channel.verify_credentials().await {
        Ok(bot) => {
            info!(bot = %bot.display_name, "Messaging credentials verified");
            true
        }
        Err(e) => {
            error!(error = %e, "Messaging credential check failed");
            false
        }
    }
}

/// Send one text message to all subscribers.
pub async fn broadcast(channel: &dyn BroadcastChannel, message: &str) -> Result<(), BroadcastError> {
    channel.broadcast(&[message.to_string()]).await?;
    info!(chars = message.chars().count(), "Broadcast sent");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
