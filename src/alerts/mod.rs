//! Alert formatting and delivery
//!
//! Failed verdicts become a single Slack-style message; successful checks
//! produce nothing at all.

pub mod formatter;
pub mod notifier;

pub use formatter::{format_reputation_alert, format_timeout_alert, SlackPayload};
pub use notifier::{AlertChannel, NotifierError, SlackWebhook};
