//! Discord webhook delivery.
//!
//! Each merge is posted as a single plain-text line. Discord answers a
//! successful webhook post with 204 No Content (or 200 when `?wait=true`).

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::types::MergedPr;
use crate::worker::Notifier;

/// Display name used for webhook posts.
pub const USERNAME: &str = "GitHub PR Monitor";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Discord rejects message content longer than this.
const MAX_CONTENT_CHARS: usize = 2000;

/// Errors that can occur while posting to the webhook.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request could not be sent or timed out.
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Discord answered with a non-success status.
    #[error("webhook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// The JSON body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookMessage {
    pub username: String,
    pub content: String,
}

impl WebhookMessage {
    pub fn for_merge(pr: &MergedPr) -> Self {
        WebhookMessage {
            username: USERNAME.to_string(),
            content: truncate(&pr.summary(), MAX_CONTENT_CHARS),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}

/// Posts merge notifications to a Discord webhook URL.
#[derive(Clone)]
pub struct DiscordNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("merge-notifier/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(DiscordNotifier {
            client,
            webhook_url: webhook_url.into(),
        })
    }

    async fn post(&self, message: &WebhookMessage) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl Notifier for DiscordNotifier {
    type Error = NotifyError;

    async fn notify_merged(&self, pr: &MergedPr) -> Result<(), NotifyError> {
        debug!(pr = %pr.number, "Sending Discord notification");
        self.post(&WebhookMessage::for_merge(pr)).await
    }
}

impl std::fmt::Debug for DiscordNotifier {
    // The webhook URL embeds its secret token.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordNotifier").finish_non_exhaustive()
    }
}
