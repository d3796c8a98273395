//! Review entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;
use yamdb_core::validators::validate_score;

use super::authored::{validate_text, Authored};

/// A review row joined with its author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    #[serde(skip)]
    pub title_id: DbId,
    pub score: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub body: Authored,
}

/// DTO for `POST /titles/{title_id}/reviews`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub text: String,
    pub score: i32,
}

impl CreateReview {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_text(&self.text)?;
        validate_score(self.score).map_err(|e| CoreError::field("score", e))
    }
}

/// DTO for `PATCH /titles/{title_id}/reviews/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub text: Option<String>,
    pub score: Option<i32>,
}

impl UpdateReview {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(text) = &self.text {
            validate_text(text)?;
        }
        if let Some(score) = self.score {
            validate_score(score).map_err(|e| CoreError::field("score", e))?;
        }
        Ok(())
    }
}
