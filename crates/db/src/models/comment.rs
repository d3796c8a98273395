//! Comment entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;

use super::authored::{validate_text, Authored};

/// A comment row joined with its author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    #[serde(skip)]
    pub review_id: DbId,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub body: Authored,
}

/// Body of `POST` and `PATCH` comment requests.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentText {
    pub text: String,
}

impl CommentText {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_text(&self.text)
    }
}
