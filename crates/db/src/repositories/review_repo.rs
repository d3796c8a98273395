//! Repository for the `reviews` table.

use sqlx::PgPool;
use yamdb_core::pagination::PageRequest;
use yamdb_core::types::DbId;

use crate::models::review::{CreateReview, Review, UpdateReview};

/// Review joined with its author's username.
const SELECT_REVIEW: &str = "\
    SELECT r.id, r.title_id, r.score, r.text, r.author_id, u.username AS author, r.pub_date \
    FROM reviews r \
    JOIN users u ON u.id = r.author_id";

/// Provides CRUD operations for reviews, always scoped to a title.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review. A second review by the same author on the same
    /// title fails on `uq_reviews_author_title`.
    pub async fn create(
        pool: &PgPool,
        title_id: DbId,
        author_id: DbId,
        input: &CreateReview,
    ) -> Result<Review, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO reviews (title_id, author_id, text, score)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(title_id)
        .bind(author_id)
        .bind(&input.text)
        .bind(input.score)
        .fetch_one(pool)
        .await?;

        Self::find(pool, title_id, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a review by ID, only if it belongs to `title_id`.
    pub async fn find(
        pool: &PgPool,
        title_id: DbId,
        id: DbId,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("{SELECT_REVIEW} WHERE r.id = $1 AND r.title_id = $2");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(title_id)
            .fetch_optional(pool)
            .await
    }

    /// `true` if a review with this ID exists, whatever its title.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviews WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// `true` if `author_id` has already reviewed `title_id`.
    pub async fn exists_for_author(
        pool: &PgPool,
        title_id: DbId,
        author_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE title_id = $1 AND author_id = $2)",
        )
        .bind(title_id)
        .bind(author_id)
        .fetch_one(pool)
        .await
    }

    /// List one page of a title's reviews, oldest first.
    pub async fn list_for_title(
        pool: &PgPool,
        title_id: DbId,
        page: PageRequest,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "{SELECT_REVIEW} WHERE r.title_id = $1 \
             ORDER BY r.pub_date, r.id \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(title_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_title(pool: &PgPool, title_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
            .bind(title_id)
            .fetch_one(pool)
            .await
    }

    /// Update text and/or score. Title and author never change.
    pub async fn update(
        pool: &PgPool,
        title_id: DbId,
        id: DbId,
        input: &UpdateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE reviews SET
                text = COALESCE($3, text),
                score = COALESCE($4, score)
             WHERE id = $1 AND title_id = $2",
        )
        .bind(id)
        .bind(title_id)
        .bind(input.text.as_deref())
        .bind(input.score)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find(pool, title_id, id).await
    }

    /// Delete a review and, by cascade, its comments.
    pub async fn delete(pool: &PgPool, title_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND title_id = $2")
            .bind(id)
            .bind(title_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
