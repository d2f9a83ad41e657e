//! Alert delivery channels

use std::time::Duration;

use async_trait::async_trait;

use super::formatter::SlackPayload;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Outbound alert boundary
///
/// A failed post never changes a check's verdict; callers log it and move on.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    async fn post(&self, payload: &SlackPayload) -> Result<(), NotifierError>;
}

/// Slack incoming-webhook channel
///
/// Incoming webhooks accept the message as a form-encoded `payload` field.
pub struct SlackWebhook {
    client: reqwest::Client,
    url: String,
}

impl SlackWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            url: url.into(),
        }
    }
}

#[async_trait]
impl AlertChannel for SlackWebhook {
    async fn post(&self, payload: &SlackPayload) -> Result<(), NotifierError> {
        let body =
            serde_json::to_string(payload).map_err(|e| NotifierError::Encode(e.to_string()))?;

        let response = self
            .client
            .post(&self.url)
            .form(&[("payload", body.as_str())])
            .send()
            .await
            .map_err(|e| NotifierError::Send(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifierError::Status(response.status().as_u16()));
        }

        tracing::debug!(url = %self.url, "Alert webhook delivered");
        Ok(())
    }
}

/// Notifier errors
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("failed to encode alert payload: {0}")]
    Encode(String),

    #[error("failed to reach alert webhook: {0}")]
    Send(String),

    #[error("alert webhook returned status {0}")]
    Status(u16),
}
