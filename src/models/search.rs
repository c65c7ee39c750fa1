//! Search condition and the flattened member/team result row.

use serde::Serialize;

/// Optional filters for a member search.
///
/// `None` and blank strings both mean "no constraint on this attribute".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberSearchCondition {
    pub username: Option<String>,
    pub team_name: Option<String>,
    /// Lower bound, inclusive (`age >= age_goe`)
    pub age_goe: Option<i32>,
    /// Upper bound, inclusive (`age <= age_loe`)
    pub age_loe: Option<i32>,
}

impl MemberSearchCondition {
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn team_name(mut self, team_name: impl Into<String>) -> Self {
        self.team_name = Some(team_name.into());
        self
    }

    pub fn age_goe(mut self, age: i32) -> Self {
        self.age_goe = Some(age);
        self
    }

    pub fn age_loe(mut self, age: i32) -> Self {
        self.age_loe = Some(age);
        self
    }
}

/// A member joined with its (optional) team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTeamRow {
    pub member_id: i64,
    pub username: String,
    pub age: i32,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
}
