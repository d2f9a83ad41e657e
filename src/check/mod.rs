//! Check orchestration
//!
//! The entry points an external scheduler drives through the HTTP surface:
//! the timeout check, the send logger, and the reputation check.

pub mod reputation;
pub mod timeout;

pub use reputation::{ReputationChecker, ReputationReport};
pub use timeout::{CheckParams, CheckReport, TimeoutChecker};

use crate::provider::ProviderError;
use crate::store::StoreError;

/// Why a check could not produce a verdict
///
/// Upstream query failures fail the whole check rather than passing as an
/// idle period; a broken query must not read as "no activity". Alert delivery
/// failures are deliberately absent here, they never change a verdict.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// Required configuration is missing. Fatal, surfaced verbatim.
    #[error("configuration error: {0}")]
    Config(&'static str),

    /// Required identifying parameters are missing.
    #[error("invalid parameters: {0}")]
    Validation(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
