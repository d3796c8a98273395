//! Handlers for `/categories` and `/genres`.
//!
//! Both resources support create, list (with `?search=`) and delete by
//! slug. There is no update. Reads are public; writes are admin only.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::error::CoreError;
use yamdb_core::pagination::{Page, PageRequest};
use yamdb_db::models::taxonomy::{NameSlug, TaxonListParams, Taxonomy};
use yamdb_db::repositories::TaxonomyRepo;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::AdminOrReadOnly;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// GET /api/v1/categories
pub async fn list_categories(
    _access: AdminOrReadOnly,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<TaxonListParams>,
) -> AppResult<Json<Page<NameSlug>>> {
    list(&state, Taxonomy::Category, params).await
}

/// POST /api/v1/categories
pub async fn create_category(
    _access: AdminOrReadOnly,
    State(state): State<AppState>,
    AppJson(input): AppJson<NameSlug>,
) -> AppResult<impl IntoResponse> {
    create(&state, Taxonomy::Category, input).await
}

/// DELETE /api/v1/categories/{slug}
///
/// Titles in the category keep existing with no category.
pub async fn delete_category(
    _access: AdminOrReadOnly,
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> AppResult<StatusCode> {
    delete(&state, Taxonomy::Category, &slug).await
}

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

/// GET /api/v1/genres
pub async fn list_genres(
    _access: AdminOrReadOnly,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<TaxonListParams>,
) -> AppResult<Json<Page<NameSlug>>> {
    list(&state, Taxonomy::Genre, params).await
}

/// POST /api/v1/genres
pub async fn create_genre(
    _access: AdminOrReadOnly,
    State(state): State<AppState>,
    AppJson(input): AppJson<NameSlug>,
) -> AppResult<impl IntoResponse> {
    create(&state, Taxonomy::Genre, input).await
}

/// DELETE /api/v1/genres/{slug}
///
/// The genre is detached from every title that had it.
pub async fn delete_genre(
    _access: AdminOrReadOnly,
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> AppResult<StatusCode> {
    delete(&state, Taxonomy::Genre, &slug).await
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

async fn list(
    state: &AppState,
    kind: Taxonomy,
    params: TaxonListParams,
) -> AppResult<Json<Page<NameSlug>>> {
    let page = PageRequest::new(params.page, state.config.page_size)?;
    let search = params.search.as_deref();

    let rows = TaxonomyRepo::list(&state.pool, kind, search, page).await?;
    let count = TaxonomyRepo::count(&state.pool, kind, search).await?;

    let results = rows.into_iter().map(|t| t.fields).collect();
    Ok(Json(Page::new(results, count, page)?))
}

async fn create(
    state: &AppState,
    kind: Taxonomy,
    input: NameSlug,
) -> AppResult<(StatusCode, Json<NameSlug>)> {
    input.validate()?;

    let created = TaxonomyRepo::create(&state.pool, kind, &input).await?;

    tracing::info!(
        id = created.id,
        slug = %created.fields.slug,
        table = kind.table(),
        "Taxon created",
    );

    Ok((StatusCode::CREATED, Json(created.fields)))
}

async fn delete(state: &AppState, kind: Taxonomy, slug: &str) -> AppResult<StatusCode> {
    if !TaxonomyRepo::delete_by_slug(&state.pool, kind, slug).await? {
        return Err(CoreError::not_found(kind.entity(), slug).into());
    }

    tracing::info!(slug, table = kind.table(), "Taxon deleted");

    Ok(StatusCode::NO_CONTENT)
}
