//! Request and response bodies of the HTTP API.
use serde::{Deserialize, Serialize};
use votes_shared::{MemberId, Period, ProjectId, VoteFilter};

use crate::server::error::ApiError;

pub const MISSING_IDS_MESSAGE: &str = "Missing projectId or userId";

/// Body of `POST /votes`. `userId` is accepted as an alias of `memberId`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    #[serde(alias = "userId")]
    pub member_id: Option<String>,
    pub project_id: Option<String>,
}

impl CastVoteRequest {
    /// Validates both identifiers, failing with the same message for either one.
    pub fn into_ids(self) -> Result<(MemberId, ProjectId), ApiError> {
        let missing = || ApiError::Validation(MISSING_IDS_MESSAGE.to_string());
        let member_id = self
            .member_id
            .and_then(|id| MemberId::new(id).ok())
            .ok_or_else(missing)?;
        let project_id = self
            .project_id
            .and_then(|id| ProjectId::new(id).ok())
            .ok_or_else(missing)?;
        Ok((member_id, project_id))
    }
}

/// Query of `GET /votes`. Empty parameters are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVotesQuery {
    pub project_id: Option<String>,
    #[serde(alias = "userId")]
    pub member_id: Option<String>,
    pub period: Option<String>,
}

impl TryFrom<ListVotesQuery> for VoteFilter {
    type Error = ApiError;

    fn try_from(query: ListVotesQuery) -> Result<Self, Self::Error> {
        Ok(VoteFilter {
            project_id: query.project_id.and_then(|id| ProjectId::new(id).ok()),
            member_id: query.member_id.and_then(|id| MemberId::new(id).ok()),
            period: parse_period(query.period)?,
        })
    }
}

/// Query of `GET /members/:member_id/quota`.
#[derive(Debug, Default, Deserialize)]
pub struct QuotaQuery {
    pub period: Option<String>,
}

/// Body returned by `DELETE /votes/:vote_id`.
#[derive(Debug, Serialize)]
pub struct RetractResponse {
    pub success: bool,
}

/// Parses an optional period label, treating an empty value as absent.
pub fn parse_period(raw: Option<String>) -> Result<Option<Period>, ApiError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) => Ok(Some(label.parse()?)),
    }
}
