//! Repository for the `categories` and `genres` tables.
//!
//! The two tables are structurally identical, so every method takes the
//! [`Taxonomy`] it should operate on and interpolates its table name.

use sqlx::PgPool;
use yamdb_core::pagination::PageRequest;
use yamdb_core::types::DbId;

use crate::contains_pattern;
use crate::models::taxonomy::{NameSlug, Taxon, Taxonomy};

const COLUMNS: &str = "id, name, slug, created_at, updated_at";

/// Provides create/list/delete operations for categories and genres.
pub struct TaxonomyRepo;

impl TaxonomyRepo {
    /// Insert a new category or genre.
    pub async fn create(
        pool: &PgPool,
        kind: Taxonomy,
        input: &NameSlug,
    ) -> Result<Taxon, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}",
            kind.table()
        );
        sqlx::query_as::<_, Taxon>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    /// Find one entry by slug.
    pub async fn find_by_slug(
        pool: &PgPool,
        kind: Taxonomy,
        slug: &str,
    ) -> Result<Option<Taxon>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {} WHERE slug = $1", kind.table());
        sqlx::query_as::<_, Taxon>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Resolve slugs to `(slug, id)` pairs. Unknown slugs are simply absent
    /// from the result; callers compare lengths to detect them.
    pub async fn find_ids_by_slugs(
        pool: &PgPool,
        kind: Taxonomy,
        slugs: &[String],
    ) -> Result<Vec<(String, DbId)>, sqlx::Error> {
        let query = format!("SELECT slug, id FROM {} WHERE slug = ANY($1)", kind.table());
        sqlx::query_as::<_, (String, DbId)>(&query)
            .bind(slugs)
            .fetch_all(pool)
            .await
    }

    /// List one page ordered by name, optionally filtered by a
    /// case-insensitive name substring.
    pub async fn list(
        pool: &PgPool,
        kind: Taxonomy,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<Taxon>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {}
             WHERE ($1::text IS NULL OR name ILIKE $1 ESCAPE '\\')
             ORDER BY name, id
             LIMIT $2 OFFSET $3",
            kind.table()
        );
        sqlx::query_as::<_, Taxon>(&query)
            .bind(search.map(contains_pattern))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Count rows matching the same search as [`TaxonomyRepo::list`].
    pub async fn count(
        pool: &PgPool,
        kind: Taxonomy,
        search: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE ($1::text IS NULL OR name ILIKE $1 ESCAPE '\\')",
            kind.table()
        );
        sqlx::query_scalar(&query)
            .bind(search.map(contains_pattern))
            .fetch_one(pool)
            .await
    }

    /// Delete by slug. Titles in a deleted category keep existing with a
    /// null category; a deleted genre is detached from all titles.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete_by_slug(
        pool: &PgPool,
        kind: Taxonomy,
        slug: &str,
    ) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE slug = $1", kind.table());
        let result = sqlx::query(&query).bind(slug).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
