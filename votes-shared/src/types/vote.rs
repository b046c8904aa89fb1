use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::{MemberId, Period, ProjectId, VoteId};

/// One member's endorsement of one project in one voting period.
///
/// A vote is immutable once recorded. Retracting it deletes the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    #[serde(rename = "voteId")]
    pub id: VoteId,
    pub project_id: ProjectId,
    pub member_id: MemberId,
    pub cast_at: DateTime<Utc>,
    pub period: Period,
}

impl Vote {
    /// Creates a fresh vote cast at `cast_at`, deriving its period from the timestamp.
    ///
    /// `cast_at` is truncated to microseconds, the precision of the stored
    /// timestamp, so the vote handed back equals the one read later.
    pub fn cast(member_id: MemberId, project_id: ProjectId, cast_at: DateTime<Utc>) -> Self {
        let cast_at = cast_at.trunc_subsecs(6);
        Self {
            id: VoteId::generate(),
            project_id,
            member_id,
            cast_at,
            period: Period::containing(cast_at),
        }
    }
}

/// Equality predicates for listing votes. Every supplied predicate must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteFilter {
    pub project_id: Option<ProjectId>,
    pub member_id: Option<MemberId>,
    pub period: Option<Period>,
}

impl VoteFilter {
    pub fn matches(&self, vote: &Vote) -> bool {
        self.project_id.as_ref().is_none_or(|p| *p == vote.project_id)
            && self.member_id.as_ref().is_none_or(|m| *m == vote.member_id)
            && self.period.is_none_or(|p| p == vote.period)
    }
}
