//! Repository for the `titles` table and its `title_genres` links.

use std::collections::HashMap;

use sqlx::PgPool;
use yamdb_core::pagination::PageRequest;
use yamdb_core::types::DbId;

use crate::contains_pattern;
use crate::models::taxonomy::NameSlug;
use crate::models::title::{TitleFilter, TitleGenre, TitleResponse, TitleRow, TitleWrite};

/// Title joined with its category; `rating` is the mean review score, or
/// NULL when the title has no reviews.
const SELECT_TITLE: &str = "\
    SELECT t.id, t.name, t.year, t.description, t.category_id, \
           c.name AS category_name, c.slug AS category_slug, \
           (SELECT AVG(r.score)::float8 FROM reviews r WHERE r.title_id = t.id) AS rating \
    FROM titles t \
    LEFT JOIN categories c ON c.id = t.category_id";

/// Provides CRUD operations for titles, keeping genre links in sync.
pub struct TitleRepo;

impl TitleRepo {
    /// Insert a title and its genre links in one transaction.
    pub async fn create(pool: &PgPool, input: &TitleWrite) -> Result<TitleResponse, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO titles (name, year, description, category_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(input.name.as_deref().unwrap_or_default())
        .bind(input.year.flatten())
        .bind(input.description.as_ref().and_then(|d| d.as_deref()))
        .bind(input.category_id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(genre_ids) = &input.genre_ids {
            link_genres(&mut tx, id, genre_ids).await?;
        }

        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a title by ID with its genres, category and rating.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TitleResponse>, sqlx::Error> {
        let query = format!("{SELECT_TITLE} WHERE t.id = $1");
        let row = sqlx::query_as::<_, TitleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut genres = Self::genres_for(pool, &[row.id]).await?;
        let genre = genres.remove(&row.id).unwrap_or_default();
        Ok(Some(TitleResponse::new(row, genre)))
    }

    /// `true` if a title with this ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM titles WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List one page of titles matching `filter`, in the requested order.
    ///
    /// The caller validates the ordering first via [`TitleFilter::order_by`].
    pub async fn list(
        pool: &PgPool,
        filter: &TitleFilter,
        order_by: &str,
        page: PageRequest,
    ) -> Result<Vec<TitleResponse>, sqlx::Error> {
        let (where_clause, bind_idx) = build_title_filter(filter);
        let query = format!(
            "{SELECT_TITLE} {where_clause} \
             ORDER BY {order_by} \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, TitleRow>(&query);
        if let Some(ref name) = filter.name {
            q = q.bind(contains_pattern(name));
        }
        if let Some(year) = filter.year {
            q = q.bind(year);
        }
        if let Some(ref category) = filter.category {
            q = q.bind(category);
        }
        if let Some(ref genre) = filter.genre {
            q = q.bind(genre);
        }
        let rows = q
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let mut genres = Self::genres_for(pool, &ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let genre = genres.remove(&row.id).unwrap_or_default();
                TitleResponse::new(row, genre)
            })
            .collect())
    }

    /// Count titles matching `filter`.
    pub async fn count(pool: &PgPool, filter: &TitleFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, _) = build_title_filter(filter);
        let query = format!(
            "SELECT COUNT(*) FROM titles t \
             LEFT JOIN categories c ON c.id = t.category_id \
             {where_clause}"
        );

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        if let Some(ref name) = filter.name {
            q = q.bind(contains_pattern(name));
        }
        if let Some(year) = filter.year {
            q = q.bind(year);
        }
        if let Some(ref category) = filter.category {
            q = q.bind(category);
        }
        if let Some(ref genre) = filter.genre {
            q = q.bind(genre);
        }
        q.fetch_one(pool).await
    }

    /// Update a title. `None` fields keep their value; `Some(None)` clears
    /// `year` or `description`. A present `genre_ids` replaces the whole
    /// genre set.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &TitleWrite,
    ) -> Result<Option<TitleResponse>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE titles SET
                name = COALESCE($2, name),
                year = CASE WHEN $3 THEN $4 ELSE year END,
                description = CASE WHEN $5 THEN $6 ELSE description END,
                category_id = COALESCE($7, category_id)
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.year.is_some())
        .bind(input.year.flatten())
        .bind(input.description.is_some())
        .bind(input.description.as_ref().and_then(|d| d.as_deref()))
        .bind(input.category_id)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(genre_ids) = &input.genre_ids {
            sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            link_genres(&mut tx, id, genre_ids).await?;
        }

        tx.commit().await?;
        Self::find_by_id(pool, id).await
    }

    /// Delete a title. Its reviews, their comments and its genre links
    /// cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Genres for each of `title_ids`, keyed by title and sorted by name.
    async fn genres_for(
        pool: &PgPool,
        title_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<NameSlug>>, sqlx::Error> {
        if title_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, TitleGenre>(
            "SELECT tg.title_id, g.name, g.slug
             FROM title_genres tg
             JOIN genres g ON g.id = tg.genre_id
             WHERE tg.title_id = ANY($1)
             ORDER BY g.name, g.id",
        )
        .bind(title_ids)
        .fetch_all(pool)
        .await?;

        let mut by_title: HashMap<DbId, Vec<NameSlug>> = HashMap::new();
        for row in rows {
            by_title.entry(row.title_id).or_default().push(row.genre);
        }
        Ok(by_title)
    }
}

/// Insert `(title_id, genre_id)` links, ignoring duplicates in `genre_ids`.
async fn link_genres(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    title_id: DbId,
    genre_ids: &[DbId],
) -> Result<(), sqlx::Error> {
    if genre_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO title_genres (title_id, genre_id)
         SELECT $1, UNNEST($2::bigint[])
         ON CONFLICT ON CONSTRAINT uq_title_genres_title_genre DO NOTHING",
    )
    .bind(title_id)
    .bind(genre_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Build the `WHERE` clause for `filter`. Returns the clause and the next
/// free bind index. Binds must be applied in the same order: name, year,
/// category, genre.
fn build_title_filter(filter: &TitleFilter) -> (String, u32) {
    let mut conditions = Vec::new();
    let mut bind_idx = 1u32;

    if filter.name.is_some() {
        conditions.push(format!("t.name ILIKE ${bind_idx} ESCAPE '\\'"));
        bind_idx += 1;
    }
    if filter.year.is_some() {
        conditions.push(format!("t.year = ${bind_idx}"));
        bind_idx += 1;
    }
    if filter.category.is_some() {
        conditions.push(format!("c.slug = ${bind_idx}"));
        bind_idx += 1;
    }
    if filter.genre.is_some() {
        conditions.push(format!(
            "EXISTS (SELECT 1 FROM title_genres tg \
                     JOIN genres g ON g.id = tg.genre_id \
                     WHERE tg.title_id = t.id AND g.slug = ${bind_idx})"
        ));
        bind_idx += 1;
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (where_clause, bind_idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_has_no_where_clause() {
        let (clause, idx) = build_title_filter(&TitleFilter::default());
        assert_eq!(clause, "");
        assert_eq!(idx, 1);
    }

    #[test]
    fn filter_binds_are_numbered_in_order() {
        let filter = TitleFilter {
            name: Some("sol".into()),
            genre: Some("drama".into()),
            ..Default::default()
        };
        let (clause, idx) = build_title_filter(&filter);
        assert!(clause.starts_with("WHERE t.name ILIKE $1 ESCAPE '\\' AND EXISTS"));
        assert!(clause.contains("g.slug = $2"));
        assert_eq!(idx, 3);
    }
}
