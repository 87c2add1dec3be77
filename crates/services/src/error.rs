//! Shared error types for the services crate.

use thiserror::Error;

use progress_core::model::EventError;
use storage::repository::StorageError;

/// Errors emitted by `ProgressService`.
///
/// `NotFound` and `Validation` are expected conditions: request handlers
/// translate them into ordinary failure responses (or a zero-valued default,
/// for the stats rollup). `Storage` carries transport-level persistence
/// failures and is surfaced to the caller as-is, without retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("no progress record for user")]
    NotFound,
    #[error(transparent)]
    Validation(#[from] EventError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
