//! In-memory delivery log

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{DeliveryRecord, DeliveryStore, ReputationSnapshot, StoreError};
use crate::aggregate::{aggregate_by_hour, HourBucket};

/// Process-local implementation of [`DeliveryStore`]
///
/// Records live in a vector behind a `parking_lot` lock; an append is one
/// push under the write lock. Suited for a single watchdog instance where the
/// log only needs to outlive the check interval.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<DeliveryRecord>>,
    reputation: RwLock<Option<ReputationSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total records currently held
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn slice(
        &self,
        to: &str,
        region: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Vec<DeliveryRecord> {
        let records = self.records.read();
        let mut matched: Vec<DeliveryRecord> = records
            .iter()
            .filter(|r| r.to == to && r.region == region && r.sent_at >= from && r.sent_at <= until)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        matched
    }
}

#[async_trait]
impl DeliveryStore for MemoryStore {
    async fn append(&self, record: DeliveryRecord) -> Result<(), StoreError> {
        self.records.write().push(record);
        Ok(())
    }

    async fn query_range(
        &self,
        to: &str,
        region: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<DeliveryRecord>, StoreError> {
        Ok(self.slice(to, region, from, until))
    }

    async fn aggregate_by_hour(
        &self,
        to: &str,
        region: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<HourBucket>, StoreError> {
        let records = self.slice(to, region, from, until);
        Ok(aggregate_by_hour(&records, |r| Some((r.sent_at, 1))))
    }

    async fn latest_reputation(&self) -> Result<Option<ReputationSnapshot>, StoreError> {
        Ok(*self.reputation.read())
    }

    async fn save_reputation(&self, snapshot: ReputationSnapshot) -> Result<(), StoreError> {
        *self.reputation.write() = Some(snapshot);
        Ok(())
    }
}
