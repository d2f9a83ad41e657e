//! Email-service-provider boundary
//!
//! The provider's send log is the source of truth the local log is validated
//! against. Only two capabilities are needed: the hourly send series for a
//! recipient, and the account status used by the reputation check.

pub mod http;

pub use http::HttpProvider;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the provider's hourly send series
///
/// The provider reports idle hours with `sent = 0`; those entries are
/// meaningful and must not be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub time: DateTime<Utc>,
    pub sent: u64,
}

/// Account health as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatus {
    pub reputation: i64,
    pub hourly_quota: i64,
}

/// Provider query errors
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Request(String),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("provider response malformed: {0}")]
    Decode(String),
}

/// Query surface of the provider's API
#[async_trait]
pub trait SendLogProvider: Send + Sync {
    /// Hourly send series for a recipient inside `[from, until]`.
    ///
    /// Entry order is unspecified; callers bucket and sort the series
    /// themselves.
    async fn search_sent_in_range(
        &self,
        to: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ProviderEntry>, ProviderError>;

    /// Current account reputation and hourly quota.
    async fn account_status(&self) -> Result<AccountStatus, ProviderError>;
}
