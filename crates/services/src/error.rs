//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::RoundSummaryError;
use quiz_core::round::RoundError;
use quiz_core::source::CatalogError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by round sessions and the quiz loop.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for round")]
    Empty,
    #[error("round has not completed yet")]
    NotCompleted,
    #[error("round was cancelled")]
    Cancelled,
    #[error(transparent)]
    Round(#[from] RoundError),
    #[error(transparent)]
    Summary(#[from] RoundSummaryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
