//! Member API endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{ChangeTeamRequest, CreateMemberRequest, Member, MemberSummary};
use crate::AppState;

/// GET /api/members - List all members.
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Vec<Member>> {
    success(state.repo.find_all_members().await?)
}

/// GET /api/members/{id} - Get a single member.
pub async fn get_member(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Member> {
    match state.repo.find_member_by_id(id).await? {
        Some(member) => success(member),
        None => Err(AppError::NotFound(format!("Member {} not found", id))),
    }
}

/// POST /api/members - Create a new member.
pub async fn create_member(
    State(state): State<AppState>,
    request: Result<Json<CreateMemberRequest>, JsonRejection>,
) -> ApiResult<Member> {
    let Json(request) = request?;
    if request.username.trim().is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    if request.age < 0 {
        return Err(AppError::Validation("Age must not be negative".to_string()));
    }

    let member = state.repo.save_member(&request).await?;
    tracing::info!(member_id = member.id, "Member created");
    success(member)
}

/// PUT /api/members/{id}/team - Move a member to another team.
pub async fn change_member_team(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    request: Result<Json<ChangeTeamRequest>, JsonRejection>,
) -> ApiResult<Member> {
    let Json(request) = request?;
    success(state.repo.change_team(id, request.team_id).await?)
}

/// GET /api/members/summaries - Username and age of every member.
pub async fn list_member_summaries(
    State(state): State<AppState>,
) -> ApiResult<Vec<MemberSummary>> {
    success(state.repo.list_member_summaries().await?)
}
