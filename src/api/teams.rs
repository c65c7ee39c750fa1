//! Team API endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateTeamRequest, Member, Team};
use crate::AppState;

/// GET /api/teams - List all teams.
pub async fn list_teams(State(state): State<AppState>) -> ApiResult<Vec<Team>> {
    success(state.repo.list_teams().await?)
}

/// POST /api/teams - Create a new team.
pub async fn create_team(
    State(state): State<AppState>,
    request: Result<Json<CreateTeamRequest>, JsonRejection>,
) -> ApiResult<Team> {
    let Json(request) = request?;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Team name is required".to_string()));
    }

    let team = state.repo.save_team(name).await?;
    tracing::info!(team_id = team.id, "Team created");
    success(team)
}

/// GET /api/teams/{id}/members - Members currently on a team.
pub async fn list_team_members(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Member>> {
    if state.repo.find_team_by_id(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Team {} not found", id)));
    }
    success(state.repo.team_members(id).await?)
}
