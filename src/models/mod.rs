//! Data models for the member search backend.
//!
//! Field names serialize as camelCase to match the JSON API.

mod member;
mod page;
mod search;
mod team;

pub use member::*;
pub use page::*;
pub use search::*;
pub use team::*;
