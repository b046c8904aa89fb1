//! Error types for the vote store.
//! Defines specific errors that can occur while reading or writing votes and tallies.
use thiserror::Error;
use votes_shared::ProjectId;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Represents errors that can occur within a vote store.
///
/// Serialization failures and deadlocks reported by the database are surfaced
/// as `Conflict` so callers can retry the whole transaction.
#[derive(Debug, Error)]
pub enum VoteStoreError {
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Transaction conflict: {0}")]
    Conflict(String),

    #[error("Project not found: {0}")]
    UnknownProject(ProjectId),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl VoteStoreError {
    /// Whether retrying the failed transaction from scratch may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<sqlx::Error> for VoteStoreError {
    fn from(err: sqlx::Error) -> Self {
        let conflict = err
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED);

        if conflict {
            Self::Conflict(err.to_string())
        } else {
            Self::Database(err)
        }
    }
}
