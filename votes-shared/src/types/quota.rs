use serde::{Deserialize, Serialize};

use super::{MemberId, Period};

/// Maximum number of votes a member may cast within a single period.
pub const VOTES_PER_PERIOD: u32 = 3;

/// How much of their quota a member has used in a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberQuota {
    pub member_id: MemberId,
    pub period: Period,
    pub votes_cast: u32,
    pub remaining: u32,
    pub quota: u32,
}

impl MemberQuota {
    pub fn new(member_id: MemberId, period: Period, votes_cast: u32, quota: u32) -> Self {
        Self {
            member_id,
            period,
            votes_cast,
            remaining: quota.saturating_sub(votes_cast),
            quota,
        }
    }
}
