//! PostgreSQL backend for the vote store.
mod rows;
mod vote_store;

pub use vote_store::PostgresVoteStore;

use crate::VoteStoreError;

/// Applies the bundled schema migrations (`projects`, `votes`).
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), VoteStoreError> {
    sqlx::migrate!("./src/postgres/migrations").run(pool).await?;
    Ok(())
}
