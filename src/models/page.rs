//! Page request, sort order and page result types.

use std::str::FromStr;

use serde::Serialize;

use crate::errors::AppError;

/// Columns a search result may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortProperty {
    Id,
    Username,
    Age,
    TeamName,
}

impl SortProperty {
    /// Qualified column in the `member m LEFT JOIN team t` query.
    pub fn column(&self) -> &'static str {
        match self {
            SortProperty::Id => "m.id",
            SortProperty::Username => "m.username",
            SortProperty::Age => "m.age",
            SortProperty::TeamName => "t.name",
        }
    }
}

impl FromStr for SortProperty {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortProperty::Id),
            "username" => Ok(SortProperty::Username),
            "age" => Ok(SortProperty::Age),
            "teamName" => Ok(SortProperty::TeamName),
            other => Err(AppError::BadRequest(format!(
                "Unknown sort property: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(AppError::BadRequest(format!(
                "Unknown sort direction: {}",
                other
            ))),
        }
    }
}

/// Ordering for a page request, parsed from `property[,direction]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub property: SortProperty,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(property: SortProperty) -> Self {
        Self {
            property,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(property: SortProperty) -> Self {
        Self {
            property,
            direction: SortDirection::Desc,
        }
    }
}

impl FromStr for Sort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (property, direction): (&str, SortDirection) = match s.split_once(',') {
            Some((p, d)) => (p.trim(), d.trim().parse()?),
            None => (s.trim(), SortDirection::Asc),
        };
        Ok(Self {
            property: property.parse()?,
            direction,
        })
    }
}

/// A zero-based page index and page size, with an optional ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Option<Sort>,
}

impl PageRequest {
    pub fn of(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One slice of a result set plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let total_pages = if request.size == 0 {
            1
        } else {
            total_elements.div_ceil(u64::from(request.size))
        };
        let number_of_elements = content.len();
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
            number_of_elements,
            first: request.page == 0,
            last: u64::from(request.page) + 1 >= total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        !self.last
    }
}
