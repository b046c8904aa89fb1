//! In-memory vote store for testing and local development.
//!
//! Every operation runs under a single async mutex, which makes the quota
//! check and the insert one atomic step just like the PostgreSQL transaction.
//!
//! # Example
//!
//! ```ignore
//! use votes_repository::MemoryVoteStore;
//! use votes_shared::ProjectId;
//!
//! let store = MemoryVoteStore::with_projects([ProjectId::new("p1")?]);
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use votes_shared::{MemberId, Period, Project, ProjectId, Vote, VoteFilter, VoteId};

use crate::{RecordOutcome, VoteStore, VoteStoreError};

#[derive(Default)]
struct MemoryState {
    votes: HashMap<VoteId, Vote>,
    projects: HashMap<ProjectId, Project>,
}

impl MemoryState {
    fn count_period_votes(&self, member_id: &MemberId, period: &Period) -> u32 {
        self.votes
            .values()
            .filter(|v| v.member_id == *member_id && v.period == *period)
            .count() as u32
    }
}

/// Vote store keeping everything in process memory.
#[derive(Default)]
pub struct MemoryVoteStore {
    state: Mutex<MemoryState>,
}

impl MemoryVoteStore {
    /// Create a new empty store without any projects.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given projects registered and a zero tally.
    pub fn with_projects(project_ids: impl IntoIterator<Item = ProjectId>) -> Self {
        let projects = project_ids
            .into_iter()
            .map(|id| {
                let project = Project {
                    id: id.clone(),
                    vote_count: 0,
                    progress: 0,
                };
                (id, project)
            })
            .collect();

        Self {
            state: Mutex::new(MemoryState {
                votes: HashMap::new(),
                projects,
            }),
        }
    }

    /// Register a project. An existing project keeps its tally.
    pub async fn add_project(&self, project_id: ProjectId) {
        let mut state = self.state.lock().await;
        state.projects.entry(project_id.clone()).or_insert(Project {
            id: project_id,
            vote_count: 0,
            progress: 0,
        });
    }

    /// Overwrite a project's cached tally without touching its votes.
    ///
    /// Only useful to simulate drift before calling `reconcile_vote_count`.
    pub async fn set_vote_count(&self, project_id: &ProjectId, vote_count: i64) {
        let mut state = self.state.lock().await;
        if let Some(project) = state.projects.get_mut(project_id) {
            project.vote_count = vote_count;
        }
    }
}

#[async_trait]
impl VoteStore for MemoryVoteStore {
    async fn get_vote(&self, id: &VoteId) -> Result<Option<Vote>, VoteStoreError> {
        Ok(self.state.lock().await.votes.get(id).cloned())
    }

    async fn list_votes(&self, filter: &VoteFilter) -> Result<Vec<Vote>, VoteStoreError> {
        let state = self.state.lock().await;
        let mut votes: Vec<Vote> = state
            .votes
            .values()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect();
        votes.sort_by(|a, b| {
            a.cast_at
                .cmp(&b.cast_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Ok(votes)
    }

    async fn count_period_votes(
        &self,
        member_id: &MemberId,
        period: &Period,
    ) -> Result<u32, VoteStoreError> {
        Ok(self.state.lock().await.count_period_votes(member_id, period))
    }

    async fn get_project(&self, project_id: &ProjectId) -> Result<Option<Project>, VoteStoreError> {
        Ok(self.state.lock().await.projects.get(project_id).cloned())
    }

    async fn record_vote(&self, vote: &Vote, quota: u32) -> Result<RecordOutcome, VoteStoreError> {
        let mut state = self.state.lock().await;

        let votes_cast = state.count_period_votes(&vote.member_id, &vote.period);
        if votes_cast >= quota {
            return Ok(RecordOutcome::QuotaReached { votes_cast });
        }

        let project = state
            .projects
            .get_mut(&vote.project_id)
            .ok_or_else(|| VoteStoreError::UnknownProject(vote.project_id.clone()))?;
        project.vote_count += 1;
        state.votes.insert(vote.id.clone(), vote.clone());

        Ok(RecordOutcome::Recorded)
    }

    async fn remove_vote(&self, id: &VoteId) -> Result<Option<Vote>, VoteStoreError> {
        let mut state = self.state.lock().await;

        let Some(vote) = state.votes.remove(id) else {
            return Ok(None);
        };
        if let Some(project) = state.projects.get_mut(&vote.project_id) {
            project.vote_count -= 1;
        }
        Ok(Some(vote))
    }

    async fn reconcile_vote_count(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<i64>, VoteStoreError> {
        let mut state = self.state.lock().await;

        let live = state
            .votes
            .values()
            .filter(|v| v.project_id == *project_id)
            .count() as i64;
        Ok(state.projects.get_mut(project_id).map(|project| {
            project.vote_count = live;
            live
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn member(id: &str) -> MemberId {
        MemberId::new(id).unwrap()
    }

    fn project(id: &str) -> ProjectId {
        ProjectId::new(id).unwrap()
    }

    fn vote_for(member_id: &str, project_id: &str) -> Vote {
        Vote::cast(
            member(member_id),
            project(project_id),
            Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_record_vote_increments_tally() {
        let store = MemoryVoteStore::with_projects([project("p1")]);
        let vote = vote_for("u1", "p1");

        let outcome = store.record_vote(&vote, 3).await.unwrap();

        assert_eq!(outcome, RecordOutcome::Recorded);
        assert_eq!(store.get_vote(&vote.id).await.unwrap(), Some(vote.clone()));
        assert_eq!(store.get_project(&project("p1")).await.unwrap().unwrap().vote_count, 1);
    }

    #[tokio::test]
    async fn test_record_vote_stops_at_quota() {
        let store = MemoryVoteStore::with_projects([project("p1")]);
        for _ in 0..2 {
            store.record_vote(&vote_for("u1", "p1"), 2).await.unwrap();
        }

        let outcome = store.record_vote(&vote_for("u1", "p1"), 2).await.unwrap();

        assert_eq!(outcome, RecordOutcome::QuotaReached { votes_cast: 2 });
        assert_eq!(store.get_project(&project("p1")).await.unwrap().unwrap().vote_count, 2);
    }

    #[tokio::test]
    async fn test_unknown_project_writes_nothing() {
        let store = MemoryVoteStore::new();
        let vote = vote_for("u1", "missing");

        let result = store.record_vote(&vote, 3).await;

        assert!(matches!(result, Err(VoteStoreError::UnknownProject(_))));
        assert!(store.get_vote(&vote.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_vote_decrements_tally() {
        let store = MemoryVoteStore::with_projects([project("p1")]);
        let vote = vote_for("u1", "p1");
        store.record_vote(&vote, 3).await.unwrap();

        assert_eq!(store.remove_vote(&vote.id).await.unwrap(), Some(vote.clone()));
        assert_eq!(store.remove_vote(&vote.id).await.unwrap(), None);
        assert_eq!(store.get_project(&project("p1")).await.unwrap().unwrap().vote_count, 0);
    }

    #[tokio::test]
    async fn test_reconcile_repairs_drift() {
        let store = MemoryVoteStore::with_projects([project("p1")]);
        store.record_vote(&vote_for("u1", "p1"), 3).await.unwrap();
        store.set_vote_count(&project("p1"), 42).await;

        assert_eq!(store.reconcile_vote_count(&project("p1")).await.unwrap(), Some(1));
        assert_eq!(store.reconcile_vote_count(&project("nope")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_add_project_keeps_existing_tally() {
        let store = MemoryVoteStore::new();
        store.add_project(project("p1")).await;
        store.record_vote(&vote_for("u1", "p1"), 3).await.unwrap();

        store.add_project(project("p1")).await;

        assert_eq!(store.get_project(&project("p1")).await.unwrap().unwrap().vote_count, 1);
    }
}
