//! Error types for the vote ledger.
//! Defines the business and infrastructure errors a ledger operation can end with.
use thiserror::Error;
use votes_repository::VoteStoreError;

/// Represents errors that can occur within the vote ledger.
///
/// No variant is ever partially applied: when an operation fails, the store
/// holds exactly what it held before the call.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Maximum {quota} votes per quarter allowed")]
    QuotaExceeded { quota: u32 },

    #[error("{0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store error: {0}")]
    Store(#[source] VoteStoreError),
}

impl From<VoteStoreError> for LedgerError {
    fn from(err: VoteStoreError) -> Self {
        match err {
            VoteStoreError::UnknownProject(project_id) => {
                Self::NotFound(format!("Project not found: {project_id}"))
            }
            VoteStoreError::Conflict(detail) => Self::StoreUnavailable(detail),
            other => Self::Store(other),
        }
    }
}
