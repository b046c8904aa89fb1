//! # Votes Shared
//! This crate defines shared data structures and types used across the vote ledger.
//! It includes identifiers, quarterly voting periods, vote records, tallies and
//! the per-member quota view.
pub mod types;

pub use types::{
    MemberId, MemberQuota, Period, Project, ProjectId, ProjectTally,
    TypeError, Vote, VoteFilter, VoteId, VOTES_PER_PERIOD,
};
