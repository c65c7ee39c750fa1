//! Member search endpoints.
//!
//! `v1` returns every match, `v2` pages with an unconditional count query and
//! `v3` pages with the count query skipped when the page already settles it.

use axum::extract::{rejection::QueryRejection, Query, State};
use serde::{Deserialize, Deserializer};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{MemberSearchCondition, MemberTeamRow, Page, PageRequest, Sort};
use crate::AppState;

/// Default number of rows per page.
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum number of rows per page allowed.
const MAX_PAGE_SIZE: u32 = 100;

/// Search and paging query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSearchParams {
    pub username: Option<String>,
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub age_goe: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub age_loe: Option<i32>,
    /// Zero-based page index (default: 0).
    #[serde(default)]
    pub page: u32,
    /// Rows per page (default: 20, capped at 100).
    pub size: Option<u32>,
    /// `property[,asc|desc]`, e.g. `username,desc`.
    pub sort: Option<String>,
}

/// Deserialize an optional integer where an empty value (`ageGoe=`) means
/// no value at all.
fn deserialize_blank_as_none<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<i32>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("Cannot parse '{s}' as an integer"))),
    }
}

impl MemberSearchParams {
    pub fn condition(&self) -> MemberSearchCondition {
        MemberSearchCondition {
            username: self.username.clone(),
            team_name: self.team_name.clone(),
            age_goe: self.age_goe,
            age_loe: self.age_loe,
        }
    }

    pub fn page_request(&self) -> Result<PageRequest, AppError> {
        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE);
        if size == 0 {
            return Err(AppError::Validation(
                "Page size must be greater than zero".to_string(),
            ));
        }

        let mut request = PageRequest::of(self.page, size.min(MAX_PAGE_SIZE));
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.trim().is_empty()) {
            request = request.sorted(sort.parse::<Sort>()?);
        }
        Ok(request)
    }
}

/// GET /api/v1/members - All members matching the condition.
pub async fn search_members(
    State(state): State<AppState>,
    params: Result<Query<MemberSearchParams>, QueryRejection>,
) -> ApiResult<Vec<MemberTeamRow>> {
    let Query(params) = params?;
    success(state.repo.search(&params.condition()).await?)
}

/// GET /api/v2/members - One page of matches, always counted.
pub async fn search_members_page_simple(
    State(state): State<AppState>,
    params: Result<Query<MemberSearchParams>, QueryRejection>,
) -> ApiResult<Page<MemberTeamRow>> {
    let Query(params) = params?;
    let request = params.page_request()?;
    success(
        state
            .repo
            .search_page_simple(&params.condition(), &request)
            .await?,
    )
}

/// GET /api/v3/members - One page of matches, counted only when needed.
pub async fn search_members_page_optimized(
    State(state): State<AppState>,
    params: Result<Query<MemberSearchParams>, QueryRejection>,
) -> ApiResult<Page<MemberTeamRow>> {
    let Query(params) = params?;
    let request = params.page_request()?;
    success(
        state
            .repo
            .search_page_optimized(&params.condition(), &request)
            .await?,
    )
}
