use serde::{Deserialize, Serialize};

use super::ProjectId;

/// An environmental restoration project as seen by the ledger.
///
/// `vote_count` is a denormalised aggregate over the live votes referencing
/// the project. `progress` is the funding percentage and is owned elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub vote_count: i64,
    pub progress: i32,
}

/// Current tally of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTally {
    pub project_id: ProjectId,
    pub vote_count: i64,
}
