//! Row types decoded from PostgreSQL and their conversion into domain values.
use chrono::{DateTime, Utc};
use votes_shared::{MemberId, Project, ProjectId, Vote, VoteId};

use crate::VoteStoreError;

#[derive(Debug, sqlx::FromRow)]
pub(super) struct VoteRow {
    pub id: String,
    pub member_id: String,
    pub project_id: String,
    pub cast_at: DateTime<Utc>,
    pub period: String,
}

impl TryFrom<VoteRow> for Vote {
    type Error = VoteStoreError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, detail: String| {
            VoteStoreError::Corrupt(format!("vote {}: {field}: {detail}", row.id))
        };

        Ok(Vote {
            member_id: MemberId::new(row.member_id.clone())
                .map_err(|e| corrupt("member_id", e.to_string()))?,
            project_id: ProjectId::new(row.project_id.clone())
                .map_err(|e| corrupt("project_id", e.to_string()))?,
            period: row
                .period
                .parse()
                .map_err(|e: votes_shared::TypeError| corrupt("period", e.to_string()))?,
            cast_at: row.cast_at,
            id: VoteId::from(row.id),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProjectRow {
    pub id: String,
    pub vote_count: i64,
    pub progress: i32,
}

impl TryFrom<ProjectRow> for Project {
    type Error = VoteStoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            id: ProjectId::new(row.id)
                .map_err(|e| VoteStoreError::Corrupt(format!("project id: {e}")))?,
            vote_count: row.vote_count,
            progress: row.progress,
        })
    }
}

pub(super) fn decode_votes(rows: Vec<VoteRow>) -> Result<Vec<Vote>, VoteStoreError> {
    rows.into_iter().map(Vote::try_from).collect()
}
