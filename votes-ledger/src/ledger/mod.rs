//! This module defines the `VoteLedger`, the quota engine that gates and
//! records votes.
//!
//! Every decision re-reads the store. The ledger keeps no counts of its own,
//! so a quota can never be approved from a stale value.
mod retry;

pub use retry::RetryPolicy;

use std::sync::Arc;

use tracing::{info, instrument, warn};
use votes_repository::{RecordOutcome, VoteStore};
use votes_shared::{
    MemberId, MemberQuota, Period, ProjectId, ProjectTally, Vote, VoteFilter, VoteId,
    VOTES_PER_PERIOD,
};

use crate::clock::Clock;
use crate::errors::LedgerError;

/// `VoteLedger` accepts vote casts and retractions and answers tally queries.
///
/// It enforces the per-member, per-period quota through a single store
/// transaction, retrying that transaction a bounded number of times when the
/// store reports a conflict.
pub struct VoteLedger {
    store: Arc<dyn VoteStore>,
    clock: Arc<dyn Clock>,
    retry_policy: RetryPolicy,
    quota: u32,
}

impl VoteLedger {
    /// Creates a new `VoteLedger` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - The vote store shared by every request handler.
    /// * `clock` - Time source used to stamp votes and derive their period.
    pub fn new(store: Arc<dyn VoteStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            retry_policy: RetryPolicy::default(),
            quota: VOTES_PER_PERIOD,
        }
    }

    /// Replaces the conflict retry policy.
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Number of votes a member may cast per period.
    pub fn quota(&self) -> u32 {
        self.quota
    }

    /// The period votes cast right now fall into.
    pub fn current_period(&self) -> Period {
        Period::containing(self.clock.now())
    }

    /// Casts a vote for `project_id` on behalf of `member_id`.
    ///
    /// The vote is stamped with the current time and period. Counting the
    /// member's votes for that period, inserting the vote and incrementing the
    /// project tally form one store transaction, retried on conflict.
    ///
    /// # Returns
    ///
    /// * `Ok(Vote)` - The recorded vote
    /// * `Err(LedgerError::QuotaExceeded)` - Member already cast their votes this period
    /// * `Err(LedgerError::NotFound)` - The project does not exist
    /// * `Err(LedgerError::StoreUnavailable)` - Conflicts persisted past the retry budget
    #[instrument(skip_all, fields(member_id = %member_id, project_id = %project_id))]
    pub async fn cast_vote(
        &self,
        member_id: MemberId,
        project_id: ProjectId,
    ) -> Result<Vote, LedgerError> {
        let vote = Vote::cast(member_id, project_id, self.clock.now());

        let outcome = self
            .retry_policy
            .run("record_vote", || self.store.record_vote(&vote, self.quota))
            .await?;

        match outcome {
            RecordOutcome::Recorded => {
                info!(vote_id = %vote.id, period = %vote.period, "Vote recorded");
                Ok(vote)
            }
            RecordOutcome::QuotaReached { votes_cast } => {
                warn!(period = %vote.period, votes_cast, quota = self.quota, "Vote quota reached");
                Err(LedgerError::QuotaExceeded { quota: self.quota })
            }
        }
    }

    /// Retracts a vote, decrementing its project's tally.
    ///
    /// Retraction is allowed at any time, including after the vote's period
    /// has ended. The freed quota slot belongs to the vote's own period.
    #[instrument(skip_all, fields(vote_id = %vote_id))]
    pub async fn retract_vote(&self, vote_id: &VoteId) -> Result<Vote, LedgerError> {
        let removed = self
            .retry_policy
            .run("remove_vote", || self.store.remove_vote(vote_id))
            .await?;

        match removed {
            Some(vote) => {
                info!(project_id = %vote.project_id, period = %vote.period, "Vote retracted");
                Ok(vote)
            }
            None => Err(LedgerError::NotFound(format!("Vote not found: {vote_id}"))),
        }
    }

    /// Looks up a single vote.
    pub async fn get_vote(&self, vote_id: &VoteId) -> Result<Vote, LedgerError> {
        self.store
            .get_vote(vote_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("Vote not found: {vote_id}")))
    }

    /// Returns the current tally of a project.
    pub async fn tally(&self, project_id: &ProjectId) -> Result<ProjectTally, LedgerError> {
        let project = self
            .store
            .get_project(project_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("Project not found: {project_id}")))?;

        Ok(ProjectTally {
            project_id: project.id,
            vote_count: project.vote_count,
        })
    }

    /// Counts the votes a member cast in `period`.
    pub async fn period_vote_count(
        &self,
        member_id: &MemberId,
        period: &Period,
    ) -> Result<u32, LedgerError> {
        Ok(self.store.count_period_votes(member_id, period).await?)
    }

    /// Reports how much of their quota a member has used in `period`, or in
    /// the current period when none is given.
    pub async fn member_quota(
        &self,
        member_id: &MemberId,
        period: Option<Period>,
    ) -> Result<MemberQuota, LedgerError> {
        let period = period.unwrap_or_else(|| self.current_period());
        let votes_cast = self.period_vote_count(member_id, &period).await?;
        Ok(MemberQuota::new(member_id.clone(), period, votes_cast, self.quota))
    }

    /// Lists votes matching `filter`. An empty filter returns every vote.
    pub async fn list_votes(&self, filter: &VoteFilter) -> Result<Vec<Vote>, LedgerError> {
        Ok(self.store.list_votes(filter).await?)
    }

    /// Recomputes a project's tally from its live votes.
    #[instrument(skip_all, fields(project_id = %project_id))]
    pub async fn reconcile_tally(&self, project_id: &ProjectId) -> Result<ProjectTally, LedgerError> {
        let vote_count = self
            .retry_policy
            .run("reconcile_vote_count", || {
                self.store.reconcile_vote_count(project_id)
            })
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("Project not found: {project_id}")))?;

        info!(vote_count, "Tally reconciled");
        Ok(ProjectTally {
            project_id: project_id.clone(),
            vote_count,
        })
    }
}
