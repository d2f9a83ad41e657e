//! Delivery log boundary
//!
//! The watchdog only ever reads a bounded day-window slice of the log and
//! appends single records; backends sit behind [`DeliveryStore`]. The bundled
//! [`MemoryStore`] keeps everything in process.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::HourBucket;

/// One outbound send as recorded by the logging path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// Recipient address
    pub to: String,
    /// Sending region the record was logged from
    pub region: String,
    pub sent_at: DateTime<Utc>,
}

/// Provider account baseline kept between reputation checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationSnapshot {
    pub reputation: i64,
    pub hourly_quota: i64,
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    Query(String),

    #[error("store write failed: {0}")]
    Write(String),
}

/// Persistence boundary for the local delivery log
#[async_trait]
pub trait DeliveryStore: Send + Sync {
    /// Append one record. A single atomic insert; records are never updated.
    async fn append(&self, record: DeliveryRecord) -> Result<(), StoreError>;

    /// Records for a recipient and region inside `[from, until]`, most
    /// recent first.
    async fn query_range(
        &self,
        to: &str,
        region: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<DeliveryRecord>, StoreError>;

    /// Per-hour counts over the same slice, most recent hour first.
    async fn aggregate_by_hour(
        &self,
        to: &str,
        region: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<HourBucket>, StoreError>;

    /// Last persisted reputation baseline, if any.
    async fn latest_reputation(&self) -> Result<Option<ReputationSnapshot>, StoreError>;

    /// Replace the reputation baseline.
    async fn save_reputation(&self, snapshot: ReputationSnapshot) -> Result<(), StoreError>;
}
