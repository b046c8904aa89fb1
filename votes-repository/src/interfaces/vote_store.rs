//! This module defines the `VoteStore` trait, which provides an interface
//! for interacting with the underlying data store for votes and project tallies.
//! It abstracts point lookups, filtered queries, atomic tally updates and the
//! transactional quota check that guards every new vote.
use votes_shared::{MemberId, Period, Project, ProjectId, Vote, VoteFilter, VoteId};

use crate::errors::VoteStoreError;

/// Result of attempting to record a vote against a member's quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The vote was inserted and the project tally incremented.
    Recorded,
    /// The member already used their quota for the period. Nothing was written.
    QuotaReached { votes_cast: u32 },
}

/// A trait that defines the interface for interacting with the vote data store.
///
/// Implementors must make `record_vote` and `remove_vote` all-or-nothing: a
/// failed call leaves neither an orphaned vote nor a stray tally change.
/// Implementations never cache counts across calls.
#[async_trait::async_trait]
pub trait VoteStore: Send + Sync {
    /// Looks up a single vote by its identifier.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier of the vote.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no such vote exists.
    async fn get_vote(&self, id: &VoteId) -> Result<Option<Vote>, VoteStoreError>;

    /// Lists votes matching every predicate of `filter`, oldest first.
    ///
    /// An empty filter returns every vote.
    async fn list_votes(&self, filter: &VoteFilter) -> Result<Vec<Vote>, VoteStoreError>;

    /// Counts the live votes of a member within a period.
    async fn count_period_votes(
        &self,
        member_id: &MemberId,
        period: &Period,
    ) -> Result<u32, VoteStoreError>;

    /// Fetches a project with its cached tally.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the project is unknown to the store.
    async fn get_project(&self, project_id: &ProjectId) -> Result<Option<Project>, VoteStoreError>;

    /// Records a vote if the member still has quota left in the vote's period.
    ///
    /// Counting the member's votes, inserting the new vote and incrementing the
    /// project tally happen in a single transaction scoped by
    /// `(member_id, period)`, so concurrent calls can never push a member past
    /// `quota`.
    ///
    /// # Arguments
    ///
    /// * `vote` - The fully built vote to persist.
    /// * `quota` - Maximum number of live votes allowed in the vote's period.
    ///
    /// # Returns
    ///
    /// * `Ok(RecordOutcome::Recorded)` - Vote inserted, tally incremented
    /// * `Ok(RecordOutcome::QuotaReached { .. })` - Quota used up, nothing written
    /// * `Err(VoteStoreError::UnknownProject)` - Target project does not exist
    /// * `Err(VoteStoreError::Conflict)` - Transaction aborted, safe to retry
    async fn record_vote(&self, vote: &Vote, quota: u32) -> Result<RecordOutcome, VoteStoreError>;

    /// Deletes a vote and decrements its project's tally in one transaction.
    ///
    /// # Returns
    ///
    /// The removed vote, or `Ok(None)` if it did not exist.
    async fn remove_vote(&self, id: &VoteId) -> Result<Option<Vote>, VoteStoreError>;

    /// Recomputes a project's cached tally from its live votes.
    ///
    /// # Returns
    ///
    /// The corrected tally, or `Ok(None)` when the project is unknown.
    async fn reconcile_vote_count(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<i64>, VoteStoreError>;
}
