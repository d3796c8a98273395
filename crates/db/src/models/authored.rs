//! Field group shared by reviews and comments: text, author and publication date.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::error::CoreError;
use yamdb_core::types::{DbId, Timestamp};
use yamdb_core::validators::validate_not_blank;

/// Text written by a user. `author` is the author's username, joined in by
/// the repository queries.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Authored {
    pub text: String,
    #[serde(skip)]
    pub author_id: DbId,
    pub author: String,
    pub pub_date: Timestamp,
}

pub(crate) fn validate_text(text: &str) -> Result<(), CoreError> {
    validate_not_blank(text).map_err(|e| CoreError::field("text", e))
}
