//! Alert payload construction
//!
//! Pure functions; posting is the channel's job.

use serde::Serialize;

use crate::provider::AccountStatus;
use crate::reconcile::ReconcileResult;
use crate::store::ReputationSnapshot;

/// Slack incoming-webhook payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlackPayload {
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub fallback: String,
    pub pretext: String,
    pub color: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

fn danger(fallback: &str, title: String, value: String) -> SlackPayload {
    SlackPayload {
        attachments: vec![Attachment {
            fallback: fallback.to_string(),
            pretext: fallback.to_string(),
            color: "danger".to_string(),
            fields: vec![Field {
                title,
                value,
                short: false,
            }],
        }],
    }
}

/// Build the stalled-sending alert, or nothing when the verdict passed.
pub fn format_timeout_alert(
    result: &ReconcileResult,
    region: &str,
    timeout_minutes: i64,
) -> Option<SlackPayload> {
    if result.success {
        return None;
    }

    Some(danger(
        "Send log check completed.",
        format!(
            "Provider send log ({}) status: Failed",
            region.to_uppercase()
        ),
        format!(
            "Email not sent after {} minutes.\nLocal count: {}\nProvider count: {}",
            timeout_minutes, result.local_count, result.provider_count
        ),
    ))
}

/// Build the reputation-regression alert.
pub fn format_reputation_alert(
    previous: &ReputationSnapshot,
    current: &AccountStatus,
) -> SlackPayload {
    danger(
        "Provider reputation/quota decreased.",
        "WARNING: Provider reputation/quota decreased".to_string(),
        format!(
            "Reputation (prev/new): {}/{}\nHourly quota (prev/new): {}/{}",
            previous.reputation, current.reputation, previous.hourly_quota, current.hourly_quota
        ),
    )
}
