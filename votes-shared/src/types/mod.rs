mod error;
mod ids;
mod period;
mod project;
mod quota;
mod vote;

pub use error::TypeError;
pub use ids::{MemberId, ProjectId, VoteId};
pub use period::Period;
pub use project::{Project, ProjectTally};
pub use quota::{MemberQuota, VOTES_PER_PERIOD};
pub use vote::{Vote, VoteFilter};
