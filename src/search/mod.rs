//! Dynamic member search predicates.
//!
//! Each condition field yields an optional fragment; present fragments are
//! folded together with AND and absent ones contribute nothing. The resulting
//! expression renders into a `sqlx::QueryBuilder` over
//! `member m LEFT JOIN team t`.

pub mod page;

use sqlx::{QueryBuilder, Sqlite};

use crate::models::{MemberSearchCondition, MemberTeamRow};

/// A boolean filter over the member/team join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberPredicate {
    UsernameEq(String),
    TeamNameEq(String),
    AgeGoe(i32),
    AgeLoe(i32),
    And(Box<MemberPredicate>, Box<MemberPredicate>),
}

impl MemberPredicate {
    pub fn and(self, other: MemberPredicate) -> MemberPredicate {
        MemberPredicate::And(Box::new(self), Box::new(other))
    }

    /// Append this predicate as SQL with bound parameters.
    pub fn push_sql(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            MemberPredicate::UsernameEq(username) => {
                builder.push("m.username = ").push_bind(username.clone());
            }
            MemberPredicate::TeamNameEq(name) => {
                builder.push("t.name = ").push_bind(name.clone());
            }
            MemberPredicate::AgeGoe(age) => {
                builder.push("m.age >= ").push_bind(*age);
            }
            MemberPredicate::AgeLoe(age) => {
                builder.push("m.age <= ").push_bind(*age);
            }
            MemberPredicate::And(left, right) => {
                builder.push("(");
                left.push_sql(builder);
                builder.push(" AND ");
                right.push_sql(builder);
                builder.push(")");
            }
        }
    }

    /// Evaluate against an already-joined row.
    ///
    /// A `NULL` team name never equals anything, as in SQL.
    pub fn matches(&self, row: &MemberTeamRow) -> bool {
        match self {
            MemberPredicate::UsernameEq(username) => row.username == *username,
            MemberPredicate::TeamNameEq(name) => row.team_name.as_deref() == Some(name.as_str()),
            MemberPredicate::AgeGoe(age) => row.age >= *age,
            MemberPredicate::AgeLoe(age) => row.age <= *age,
            MemberPredicate::And(left, right) => left.matches(row) && right.matches(row),
        }
    }
}

/// Non-blank text. Blank means empty or only Unicode `White_Space`, so a
/// value made of no-break spaces (U+00A0) also counts as blank.
fn has_text(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn username_eq(username: Option<&str>) -> Option<MemberPredicate> {
    has_text(username).map(|u| MemberPredicate::UsernameEq(u.to_string()))
}

pub fn team_name_eq(team_name: Option<&str>) -> Option<MemberPredicate> {
    has_text(team_name).map(|n| MemberPredicate::TeamNameEq(n.to_string()))
}

pub fn age_goe(age: Option<i32>) -> Option<MemberPredicate> {
    age.map(MemberPredicate::AgeGoe)
}

pub fn age_loe(age: Option<i32>) -> Option<MemberPredicate> {
    age.map(MemberPredicate::AgeLoe)
}

/// Age range filter: `age_goe` is the inclusive lower bound, `age_loe` the
/// inclusive upper bound. Either may be absent.
pub fn age_between(lower: Option<i32>, upper: Option<i32>) -> Option<MemberPredicate> {
    match (age_goe(lower), age_loe(upper)) {
        (Some(lower), Some(upper)) => Some(lower.and(upper)),
        (None, Some(upper)) => Some(upper),
        (Some(lower), None) => Some(lower),
        (None, None) => None,
    }
}

/// Fold every present fragment of `condition` into one predicate.
///
/// Returns `None` when the condition constrains nothing.
pub fn compose(condition: &MemberSearchCondition) -> Option<MemberPredicate> {
    [
        username_eq(condition.username.as_deref()),
        team_name_eq(condition.team_name.as_deref()),
        age_between(condition.age_goe, condition.age_loe),
    ]
    .into_iter()
    .flatten()
    .reduce(MemberPredicate::and)
}

/// Append ` WHERE <predicate>` when there is a predicate.
pub fn push_where(builder: &mut QueryBuilder<'_, Sqlite>, predicate: Option<&MemberPredicate>) {
    if let Some(predicate) = predicate {
        builder.push(" WHERE ");
        predicate.push_sql(builder);
    }
}
