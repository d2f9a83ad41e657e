//! The timeout check: has sending silently stalled?

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::CheckError;
use crate::aggregate::aggregate_by_hour;
use crate::alerts::{format_timeout_alert, AlertChannel};
use crate::provider::SendLogProvider;
use crate::reconcile::{reconcile, ReconcileResult};
use crate::store::{DeliveryRecord, DeliveryStore};

/// Parameters of one check invocation
#[derive(Debug, Clone, Deserialize)]
pub struct CheckParams {
    /// Recipient address the watchdog sends through
    pub to: String,
    /// Sending region under watch
    pub region: String,
    /// Grace window override, minutes
    #[serde(default)]
    pub timeout_minutes: Option<i64>,
}

/// What one check run concluded
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub success: bool,
    pub timeout_minutes: i64,
    pub local_count: u64,
    pub provider_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_since_last_sent: Option<i64>,
}

/// Reconciles the local delivery log against the provider's send log
///
/// One instance per process; every run gets its own parameters and owns no
/// state between invocations.
pub struct TimeoutChecker {
    store: Arc<dyn DeliveryStore>,
    provider: Option<Arc<dyn SendLogProvider>>,
    channel: Option<Arc<dyn AlertChannel>>,
    default_timeout_minutes: i64,
}

fn validate_params(to: &str, region: &str) -> Result<(), CheckError> {
    if to.trim().is_empty() || region.trim().is_empty() {
        return Err(CheckError::Validation(
            "parameters \"to\" and \"region\" must both be set",
        ));
    }
    Ok(())
}

/// UTC day window containing `now`, inclusive on both ends
fn day_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (start, end)
}

impl TimeoutChecker {
    pub fn new(
        store: Arc<dyn DeliveryStore>,
        provider: Option<Arc<dyn SendLogProvider>>,
        channel: Option<Arc<dyn AlertChannel>>,
        default_timeout_minutes: i64,
    ) -> Self {
        Self {
            store,
            provider,
            channel,
            default_timeout_minutes,
        }
    }

    /// Run the check for today's UTC day window.
    pub async fn run(&self, params: &CheckParams) -> Result<CheckReport, CheckError> {
        self.run_at(params, Utc::now()).await
    }

    async fn run_at(
        &self,
        params: &CheckParams,
        now: DateTime<Utc>,
    ) -> Result<CheckReport, CheckError> {
        let provider = self.provider.as_ref().ok_or(CheckError::Config(
            "provider API key is not set; timeout checks are disabled",
        ))?;
        validate_params(&params.to, &params.region)?;

        let timeout_minutes = params
            .timeout_minutes
            .unwrap_or(self.default_timeout_minutes);
        let (from, until) = day_window(now);

        // The two sources are independent; fetch them concurrently and join
        // before aggregation.
        let local_fetch = async {
            let buckets = self
                .store
                .aggregate_by_hour(&params.to, &params.region, from, until)
                .await?;
            let records = self
                .store
                .query_range(&params.to, &params.region, from, until)
                .await?;
            Ok::<_, CheckError>((buckets, records))
        };
        let provider_fetch = async {
            provider
                .search_sent_in_range(&params.to, from, until)
                .await
                .map_err(CheckError::from)
        };
        let ((local_buckets, records), series) = tokio::try_join!(local_fetch, provider_fetch)?;

        let provider_buckets = aggregate_by_hour(&series, |entry| Some((entry.time, entry.sent)));
        let last_sent_at = records.iter().map(|r| r.sent_at).max();

        let result = reconcile(
            &local_buckets,
            &provider_buckets,
            last_sent_at,
            timeout_minutes,
            now,
        );

        tracing::info!(
            to = %params.to,
            region = %params.region,
            success = result.success,
            local = result.local_count,
            provider = result.provider_count,
            "Timeout check completed"
        );

        self.deliver_alert(&result, &params.region, timeout_minutes)
            .await;

        Ok(CheckReport {
            success: result.success,
            timeout_minutes,
            local_count: result.local_count,
            provider_count: result.provider_count,
            last_sent_at: result.last_sent_at,
            minutes_since_last_sent: result.minutes_since_last_sent,
        })
    }

    /// Record one outbound send. A single atomic insert, nothing reconciled.
    pub async fn log_send(&self, to: &str, region: &str) -> Result<(), CheckError> {
        validate_params(to, region)?;

        self.store
            .append(DeliveryRecord {
                to: to.to_string(),
                region: region.to_string(),
                sent_at: Utc::now(),
            })
            .await?;

        tracing::info!(to = %to, region = %region, "Send logged");
        Ok(())
    }

    async fn deliver_alert(&self, result: &ReconcileResult, region: &str, timeout_minutes: i64) {
        let payload = match format_timeout_alert(result, region, timeout_minutes) {
            Some(payload) => payload,
            None => return,
        };

        tracing::warn!(
            region = %region,
            local = result.local_count,
            provider = result.provider_count,
            "Send activity diverged past the grace window"
        );

        match &self.channel {
            Some(channel) => {
                if let Err(e) = channel.post(&payload).await {
                    // The verdict stands even when the alert cannot go out
                    tracing::error!(error = %e, "Failed to deliver alert");
                }
            }
            None => {
                tracing::warn!(
                    payload = %serde_json::to_string(&payload).unwrap_or_default(),
                    "No alert webhook configured; alert not delivered"
                );
            }
        }
    }
}
