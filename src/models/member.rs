//! Member model.

use serde::{Deserialize, Serialize};

/// A member, optionally belonging to one team.
///
/// `team_id` is the only stored side of the member/team association; a team's
/// membership is always computed from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub username: String,
    pub age: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i64>,
}

/// Request body for creating a new member.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    pub username: String,
    #[serde(default)]
    pub age: i32,
    #[serde(default)]
    pub team_id: Option<i64>,
}

impl CreateMemberRequest {
    pub fn new(username: impl Into<String>, age: i32) -> Self {
        Self {
            username: username.into(),
            age,
            team_id: None,
        }
    }

    pub fn with_team(mut self, team_id: i64) -> Self {
        self.team_id = Some(team_id);
        self
    }
}

/// Request body for moving a member to another team.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeTeamRequest {
    pub team_id: i64,
}

/// Username/age projection of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub username: String,
    pub age: i32,
}
