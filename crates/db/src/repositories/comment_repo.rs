//! Repository for the `comments` table.

use sqlx::PgPool;
use yamdb_core::pagination::PageRequest;
use yamdb_core::types::DbId;

use crate::models::comment::{Comment, CommentText};

const SELECT_COMMENT: &str = "\
    SELECT c.id, c.review_id, c.text, c.author_id, u.username AS author, c.pub_date \
    FROM comments c \
    JOIN users u ON u.id = c.author_id";

/// Provides CRUD operations for comments, always scoped to a review.
pub struct CommentRepo;

impl CommentRepo {
    pub async fn create(
        pool: &PgPool,
        review_id: DbId,
        author_id: DbId,
        input: &CommentText,
    ) -> Result<Comment, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO comments (review_id, author_id, text)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(review_id)
        .bind(author_id)
        .bind(&input.text)
        .fetch_one(pool)
        .await?;

        Self::find(pool, review_id, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a comment by ID, only if it belongs to `review_id`.
    pub async fn find(
        pool: &PgPool,
        review_id: DbId,
        id: DbId,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("{SELECT_COMMENT} WHERE c.id = $1 AND c.review_id = $2");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(review_id)
            .fetch_optional(pool)
            .await
    }

    /// List one page of a review's comments, oldest first.
    pub async fn list_for_review(
        pool: &PgPool,
        review_id: DbId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "{SELECT_COMMENT} WHERE c.review_id = $1 \
             ORDER BY c.pub_date, c.id \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(review_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_review(pool: &PgPool, review_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = $1")
            .bind(review_id)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        review_id: DbId,
        id: DbId,
        input: &CommentText,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let result =
            sqlx::query("UPDATE comments SET text = $3 WHERE id = $1 AND review_id = $2")
                .bind(id)
                .bind(review_id)
                .bind(&input.text)
                .execute(pool)
                .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find(pool, review_id, id).await
    }

    pub async fn delete(pool: &PgPool, review_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND review_id = $2")
            .bind(id)
            .bind(review_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
