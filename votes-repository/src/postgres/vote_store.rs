//! PostgreSQL implementation of the vote store.
//!
//! Provides the production backend for the `VoteStore` trait with connection
//! pooling and transaction safety.
//!
//! ## Key Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - Quota checks serialised per `(member_id, period)` with a transaction-scoped
//!   advisory lock, so check and insert behave as one atomic step
//! - Tally updates with `vote_count = vote_count + 1`, never read-modify-write
//! - Automatic rollback when a transaction is dropped before commit
//!
//! ## Database Tables
//!
//! - `projects`: Restoration projects with their cached `vote_count`
//! - `votes`: One row per live vote, tagged with its quarterly period
use async_trait::async_trait;
use tracing::debug;
use votes_shared::{MemberId, Period, Project, ProjectId, Vote, VoteFilter, VoteId};

use super::rows::{ProjectRow, VoteRow, decode_votes};
use crate::{RecordOutcome, VoteStore, VoteStoreError};

const VOTE_COLUMNS: &str = "id, member_id, project_id, cast_at, period";

/// PostgreSQL implementation of the vote store.
///
/// The pool is created and owned by the process entry point and handed in
/// here, the store never opens connections on its own.
pub struct PostgresVoteStore {
    pool: sqlx::PgPool,
}

impl PostgresVoteStore {
    /// Creates a new PostgreSQL vote store.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the required schema
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Checks if the `projects` and `votes` tables exist.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If both tables are created
    pub async fn check_tables_created(&self) -> Result<bool, VoteStoreError> {
        for table in ["projects", "votes"] {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?;
            if !exists {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Registers a project, leaving an existing one untouched.
    ///
    /// Projects are owned by the catalogue, this exists for provisioning and tests.
    pub async fn ensure_project(&self, project_id: &ProjectId) -> Result<(), VoteStoreError> {
        sqlx::query("INSERT INTO projects (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(project_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Takes the advisory lock guarding the quota of `(member_id, period)`.
    ///
    /// The lock is released when the surrounding transaction commits or rolls back.
    async fn lock_member_period(
        &self,
        member_id: &MemberId,
        period: &Period,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<(), VoteStoreError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("{member_id}:{period}"))
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn count_period_votes_tx(
        &self,
        member_id: &MemberId,
        period: &Period,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<u32, VoteStoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE member_id = $1 AND period = $2")
                .bind(member_id.as_str())
                .bind(period.to_string())
                .fetch_one(&mut **tx)
                .await?;
        Ok(count as u32)
    }

    /// Adds `delta` to a project's tally within an active transaction.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The project exists and its tally was updated
    /// * `Ok(false)` - No such project
    async fn adjust_vote_count_tx(
        &self,
        project_id: &ProjectId,
        delta: i64,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<bool, VoteStoreError> {
        let result = sqlx::query(
            "UPDATE projects SET vote_count = vote_count + $2, updated_at = now() WHERE id = $1",
        )
        .bind(project_id.as_str())
        .bind(delta)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl VoteStore for PostgresVoteStore {
    async fn get_vote(&self, id: &VoteId) -> Result<Option<Vote>, VoteStoreError> {
        let row = sqlx::query_as::<_, VoteRow>(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Vote::try_from).transpose()
    }

    /// Lists votes with a dynamically built `WHERE` clause.
    async fn list_votes(&self, filter: &VoteFilter) -> Result<Vec<Vote>, VoteStoreError> {
        let mut query_builder =
            sqlx::QueryBuilder::new(format!("SELECT {VOTE_COLUMNS} FROM votes WHERE TRUE"));

        if let Some(project_id) = &filter.project_id {
            query_builder.push(" AND project_id = ").push_bind(project_id.as_str());
        }
        if let Some(member_id) = &filter.member_id {
            query_builder.push(" AND member_id = ").push_bind(member_id.as_str());
        }
        if let Some(period) = &filter.period {
            query_builder.push(" AND period = ").push_bind(period.to_string());
        }
        query_builder.push(" ORDER BY cast_at ASC, id ASC");

        let rows = query_builder
            .build_query_as::<VoteRow>()
            .fetch_all(&self.pool)
            .await?;

        decode_votes(rows)
    }

    async fn count_period_votes(
        &self,
        member_id: &MemberId,
        period: &Period,
    ) -> Result<u32, VoteStoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE member_id = $1 AND period = $2")
                .bind(member_id.as_str())
                .bind(period.to_string())
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u32)
    }

    async fn get_project(&self, project_id: &ProjectId) -> Result<Option<Project>, VoteStoreError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            "SELECT id, vote_count, progress FROM projects WHERE id = $1",
        )
        .bind(project_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Project::try_from).transpose()
    }

    /// Counts, inserts and increments under the `(member_id, period)` advisory lock.
    ///
    /// Returning early drops the transaction, which rolls it back.
    async fn record_vote(&self, vote: &Vote, quota: u32) -> Result<RecordOutcome, VoteStoreError> {
        let mut tx = self.pool.begin().await?;
        self.lock_member_period(&vote.member_id, &vote.period, &mut tx)
            .await?;

        let votes_cast = self
            .count_period_votes_tx(&vote.member_id, &vote.period, &mut tx)
            .await?;
        if votes_cast >= quota {
            tx.rollback().await?;
            return Ok(RecordOutcome::QuotaReached { votes_cast });
        }

        if !self.adjust_vote_count_tx(&vote.project_id, 1, &mut tx).await? {
            tx.rollback().await?;
            return Err(VoteStoreError::UnknownProject(vote.project_id.clone()));
        }

        sqlx::query(&format!(
            "INSERT INTO votes ({VOTE_COLUMNS}) VALUES ($1, $2, $3, $4, $5)"
        ))
        .bind(vote.id.as_str())
        .bind(vote.member_id.as_str())
        .bind(vote.project_id.as_str())
        .bind(vote.cast_at)
        .bind(vote.period.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(vote_id = %vote.id, votes_cast = votes_cast + 1, "vote row committed");
        Ok(RecordOutcome::Recorded)
    }

    async fn remove_vote(&self, id: &VoteId) -> Result<Option<Vote>, VoteStoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, VoteRow>(&format!(
            "DELETE FROM votes WHERE id = $1 RETURNING {VOTE_COLUMNS}"
        ))
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let vote = Vote::try_from(row)?;

        self.adjust_vote_count_tx(&vote.project_id, -1, &mut tx)
            .await?;
        tx.commit().await?;
        Ok(Some(vote))
    }

    /// Locks the project row first so every vote transaction touching it has
    /// either committed or not started when the live rows are counted.
    async fn reconcile_vote_count(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<i64>, VoteStoreError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<String> =
            sqlx::query_scalar("SELECT id FROM projects WHERE id = $1 FOR UPDATE")
                .bind(project_id.as_str())
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let live: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE project_id = $1")
            .bind(project_id.as_str())
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE projects SET vote_count = $2, updated_at = now() WHERE id = $1")
            .bind(project_id.as_str())
            .bind(live)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(live))
    }
}
