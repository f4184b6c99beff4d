//! Persistence for monitoring requests.

mod memory;
mod postgres;

pub use memory::InMemoryMonitoringStore;
pub use postgres::PgMonitoringStore;

use async_trait::async_trait;

use crate::domain::{MonitoringRequest, MonitoringRequestId, NewMonitoringRequest};

/// Column width of `monitoring_request.email`.
pub const MAX_EMAIL_CHARS: usize = 120;
/// Column width of `monitoring_request.month`.
pub const MAX_MONTH_CHARS: usize = 20;

/// Storage contract shared by the web handlers and the poll loop.
///
/// Writers only ever move `active` from `true` to `false`, so concurrent
/// deactivation of the same record is harmless.
#[async_trait]
pub trait MonitoringStore: Send + Sync {
    async fn create(&self, request: NewMonitoringRequest)
        -> Result<MonitoringRequest, StoreError>;

    /// Every record, newest first.
    async fn list_all(&self) -> Result<Vec<MonitoringRequest>, StoreError>;

    /// Records still awaiting a detection, oldest id first.
    async fn list_active(&self) -> Result<Vec<MonitoringRequest>, StoreError>;

    /// Marks the record inactive. Already-inactive records are left as is.
    async fn deactivate(&self, id: MonitoringRequestId) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("monitoring request not found")]
    NotFound,
    #[error("invalid monitoring request: {0}")]
    Invalid(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub(crate) fn validate_lengths(request: &NewMonitoringRequest) -> Result<(), StoreError> {
    if request.email().chars().count() > MAX_EMAIL_CHARS {
        return Err(StoreError::Invalid(format!(
            "email exceeds {MAX_EMAIL_CHARS} characters"
        )));
    }
    if request.month().chars().count() > MAX_MONTH_CHARS {
        return Err(StoreError::Invalid(format!(
            "month exceeds {MAX_MONTH_CHARS} characters"
        )));
    }
    Ok(())
}
