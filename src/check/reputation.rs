//! The reputation check: did account standing regress?
//!
//! Same shape as the timeout check, over a different pair of views: the
//! previously stored baseline versus what the provider reports right now.

use std::sync::Arc;

use serde::Serialize;

use super::CheckError;
use crate::alerts::{format_reputation_alert, AlertChannel};
use crate::provider::SendLogProvider;
use crate::store::{DeliveryStore, ReputationSnapshot};

/// What one reputation run concluded
#[derive(Debug, Clone, Serialize)]
pub struct ReputationReport {
    pub regressed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<ReputationSnapshot>,
    pub current: ReputationSnapshot,
}

/// Compares the provider's account status against the stored baseline
pub struct ReputationChecker {
    store: Arc<dyn DeliveryStore>,
    provider: Option<Arc<dyn SendLogProvider>>,
    channel: Option<Arc<dyn AlertChannel>>,
}

impl ReputationChecker {
    pub fn new(
        store: Arc<dyn DeliveryStore>,
        provider: Option<Arc<dyn SendLogProvider>>,
        channel: Option<Arc<dyn AlertChannel>>,
    ) -> Self {
        Self {
            store,
            provider,
            channel,
        }
    }

    pub async fn run(&self) -> Result<ReputationReport, CheckError> {
        let provider = self.provider.as_ref().ok_or(CheckError::Config(
            "provider API key is not set; reputation checks are disabled",
        ))?;

        let status = provider.account_status().await?;
        let current = ReputationSnapshot {
            reputation: status.reputation,
            hourly_quota: status.hourly_quota,
        };
        let previous = self.store.latest_reputation().await?;

        match previous {
            Some(prev)
                if current.reputation < prev.reputation
                    || current.hourly_quota < prev.hourly_quota =>
            {
                tracing::warn!(
                    prev_reputation = prev.reputation,
                    reputation = current.reputation,
                    prev_quota = prev.hourly_quota,
                    quota = current.hourly_quota,
                    "Provider reputation or quota decreased"
                );

                let payload = format_reputation_alert(&prev, &status);
                match &self.channel {
                    Some(channel) => {
                        if let Err(e) = channel.post(&payload).await {
                            tracing::error!(error = %e, "Failed to deliver alert");
                        }
                    }
                    None => {
                        tracing::warn!("No alert webhook configured; alert not delivered");
                    }
                }

                // The baseline stays at the old values so recovery is
                // measured against them, not against the dip.
                Ok(ReputationReport {
                    regressed: true,
                    previous: Some(prev),
                    current,
                })
            }
            _ => {
                self.store.save_reputation(current).await?;
                tracing::info!(
                    reputation = current.reputation,
                    quota = current.hourly_quota,
                    "Reputation baseline updated"
                );

                Ok(ReputationReport {
                    regressed: false,
                    previous,
                    current,
                })
            }
        }
    }
}
