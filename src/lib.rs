//! Sendwatch: outbound-email delivery watchdog
//!
//! Reconciles two independently recorded views of outbound-email activity,
//! the local delivery log and the email provider's send log, to detect
//! whether sending has silently stalled for a recipient/region pair. A
//! scheduler drives the checks through the HTTP API; failing verdicts raise
//! a single Slack-style alert.
//!
//! # How a check works
//!
//! Both logs are reduced to hourly counts over the current UTC day, the most
//! recent hour with activity in either source is selected (backing off one
//! hour when both are silent), and a provider undercount relative to the
//! local log is classified as transient inside the grace window or as an
//! outage past it.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use sendwatch::aggregate::HourBucket;
//! use sendwatch::reconcile::reconcile;
//!
//! let now = Utc.with_ymd_and_hms(2024, 5, 14, 14, 45, 0).unwrap();
//! let local = vec![HourBucket { hour: 14, count: 3 }];
//! let provider = vec![HourBucket { hour: 14, count: 3 }];
//!
//! let verdict = reconcile(&local, &provider, None, 10, now);
//! assert!(verdict.success);
//! ```

pub mod aggregate;
pub mod alerts;
pub mod api;
pub mod check;
pub mod provider;
pub mod reconcile;
pub mod store;

// Re-export commonly used types
pub use aggregate::{aggregate_by_hour, HourBucket};
pub use check::{CheckError, CheckParams, CheckReport, ReputationChecker, TimeoutChecker};
pub use reconcile::{reconcile, ReconcileResult};
pub use store::{DeliveryRecord, DeliveryStore, MemoryStore};
