//! Outcome notifications
//!
//! Delivers a single human-readable status line to an operator-facing channel.
//! Delivery is best effort: callers log failures and carry on.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{ClientError, Result};

/// Channel that receives the final status message of a run
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<()>;
}

/// Posts messages to an incoming webhook (Slack-compatible `{"text": ...}` payload)
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: String,
    client: Client,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

impl WebhookNotifier {
    /// Upper bound for a single delivery
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a notifier posting to `url`
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Self::REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(url, client))
    }

    /// Create a notifier with a custom HTTP client
    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        debug!("Posting notification to webhook");

        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text: message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::WebhookError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(())
    }
}

/// Notifier used when no destination is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        debug!("Notifications disabled, dropping message: {}", message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = WebhookPayload { text: "Instance i-1 is already running" };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "Instance i-1 is already running" }));
    }

    #[test]
    fn test_webhook_notifier_creation() {
        let notifier = WebhookNotifier::new("https://hooks.slack.com/services/T000/B000/XXXX").unwrap();
        assert_eq!(notifier.url(), "https://hooks.slack.com/services/T000/B000/XXXX");
    }

    #[tokio::test]
    async fn test_disabled_notifier_never_fails() {
        assert!(DisabledNotifier.notify("anything").await.is_ok());
    }
}
