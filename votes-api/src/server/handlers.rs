// HTTP request handlers
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, info};
use votes_shared::{MemberId, MemberQuota, ProjectId, ProjectTally, Vote, VoteFilter, VoteId};

use crate::server::error::ApiError;
use crate::server::models::{
    CastVoteRequest, ListVotesQuery, MISSING_IDS_MESSAGE, QuotaQuery, RetractResponse,
    parse_period,
};
use crate::server::state::AppState;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Votes API is running")
}

/// Casts a vote. A malformed or incomplete body is a validation error.
pub async fn cast_vote_handler(
    State(state): State<AppState>,
    payload: Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Vote>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection, "Rejected vote payload");
        ApiError::Validation(MISSING_IDS_MESSAGE.to_string())
    })?;
    let (member_id, project_id) = request.into_ids()?;

    let vote = state.ledger.cast_vote(member_id, project_id).await?;
    Ok((StatusCode::CREATED, Json(vote)))
}

/// Lists votes, optionally filtered by project, member and period.
pub async fn list_votes_handler(
    State(state): State<AppState>,
    query: Result<Query<ListVotesQuery>, QueryRejection>,
) -> Result<Json<Vec<Vote>>, ApiError> {
    let Query(query) = query.map_err(query_error)?;
    let filter = VoteFilter::try_from(query)?;
    let votes = state.ledger.list_votes(&filter).await?;
    Ok(Json(votes))
}

/// Retracts a vote.
pub async fn retract_vote_handler(
    State(state): State<AppState>,
    Path(vote_id): Path<String>,
) -> Result<Json<RetractResponse>, ApiError> {
    let vote = state.ledger.retract_vote(&VoteId::from(vote_id)).await?;
    info!(vote_id = %vote.id, "Vote retracted via API");
    Ok(Json(RetractResponse { success: true }))
}

/// Returns the current tally of a project.
pub async fn tally_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectTally>, ApiError> {
    let project_id = ProjectId::new(project_id)?;
    Ok(Json(state.ledger.tally(&project_id).await?))
}

/// Recomputes a project's tally from its live votes.
pub async fn reconcile_tally_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectTally>, ApiError> {
    let project_id = ProjectId::new(project_id)?;
    Ok(Json(state.ledger.reconcile_tally(&project_id).await?))
}

/// Reports a member's quota usage for the current or the requested period.
pub async fn member_quota_handler(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    query: Result<Query<QuotaQuery>, QueryRejection>,
) -> Result<Json<MemberQuota>, ApiError> {
    let Query(query) = query.map_err(query_error)?;
    let member_id = MemberId::new(member_id)?;
    let period = parse_period(query.period)?;
    Ok(Json(state.ledger.member_quota(&member_id, period).await?))
}

fn query_error(rejection: QueryRejection) -> ApiError {
    debug!(error = %rejection, "Rejected query string");
    ApiError::Validation(rejection.body_text())
}
