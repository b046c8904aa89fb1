use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;
use votes_ledger::{RetryPolicy, SystemClock, VoteLedger};
use votes_repository::postgres::run_migrations;
use votes_repository::{MemoryVoteStore, PostgresVoteStore, VoteStore};

use crate::config::{Config, StoreBackend};
use crate::errors::{ConfigError, ServiceError};

/// `Dependencies` holds the components the HTTP service runs on.
///
/// The process entry point creates it once and owns it, so the database pool
/// lives exactly as long as the server.
pub struct Dependencies {
    pub ledger: Arc<VoteLedger>,
    pub pool: Option<sqlx::PgPool>,
}

impl Dependencies {
    /// Creates a new `Dependencies` instance.
    ///
    /// Connects to PostgreSQL (and applies migrations when enabled) or builds
    /// an in-memory store, then wires the vote ledger on top of it.
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok(Self)` on successful initialization or a
    /// `ServiceError` if any dependency fails to initialize.
    pub async fn new(config: &Config) -> Result<Self, ServiceError> {
        let (store, pool): (Arc<dyn VoteStore>, Option<sqlx::PgPool>) = match config.store_backend
        {
            StoreBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .ok_or(ConfigError::Missing("DATABASE_URL"))?;

                let pool = PgPoolOptions::new()
                    .max_connections(config.database_max_connections)
                    .connect(database_url)
                    .await?;

                if config.run_migrations {
                    run_migrations(&pool).await?;
                    info!("Database migrations applied");
                }

                let store: Arc<dyn VoteStore> = Arc::new(PostgresVoteStore::new(pool.clone()));
                (store, Some(pool))
            }
            StoreBackend::Memory => {
                info!(
                    projects = config.memory_projects.len(),
                    "Using in-memory vote store"
                );
                let store: Arc<dyn VoteStore> = Arc::new(MemoryVoteStore::with_projects(
                    config.memory_projects.iter().cloned(),
                ));
                (store, None)
            }
        };

        let ledger = VoteLedger::new(store, Arc::new(SystemClock))
            .with_retry_policy(RetryPolicy::with_max_retries(config.conflict_retries));

        Ok(Self {
            ledger: Arc::new(ledger),
            pool,
        })
    }
}
