//! Handlers for the `/titles` resource.
//!
//! Reads return the title with its nested category, genres and aggregate
//! rating. Writes reference category and genres by slug. Reads are public;
//! writes are admin only.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::error::CoreError;
use yamdb_core::pagination::{Page, PageRequest};
use yamdb_core::types::DbId;
use yamdb_core::validators::FieldError;
use yamdb_db::models::taxonomy::Taxonomy;
use yamdb_db::models::title::{CreateTitle, TitleFilter, TitleResponse, TitleWrite, UpdateTitle};
use yamdb_db::repositories::{TaxonomyRepo, TitleRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::AdminOrReadOnly;
use crate::state::AppState;

/// GET /api/v1/titles
///
/// Filters: `name` (partial), `year`, `category` and `genre` (slugs).
/// Ordering: `ordering=name|year|rating|id`, `-` prefix for descending.
pub async fn list_titles(
    _access: AdminOrReadOnly,
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<TitleFilter>,
) -> AppResult<Json<Page<TitleResponse>>> {
    let order_by = filter.order_by()?;
    let page = PageRequest::new(filter.page, state.config.page_size)?;

    let titles = TitleRepo::list(&state.pool, &filter, &order_by, page).await?;
    let count = TitleRepo::count(&state.pool, &filter).await?;

    Ok(Json(Page::new(titles, count, page)?))
}

/// GET /api/v1/titles/{id}
pub async fn get_title(
    _access: AdminOrReadOnly,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<TitleResponse>> {
    let title = TitleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Title", id))?;
    Ok(Json(title))
}

/// POST /api/v1/titles
pub async fn create_title(
    _access: AdminOrReadOnly,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateTitle>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let write = TitleWrite {
        name: Some(input.name),
        year: Some(input.year),
        description: Some(input.description),
        category_id: Some(resolve_category(&state, &input.category).await?),
        genre_ids: Some(resolve_genres(&state, &input.genre).await?),
    };
    let title = TitleRepo::create(&state.pool, &write).await?;

    tracing::info!(title_id = title.id, name = %title.name, "Title created");

    Ok((StatusCode::CREATED, Json(title)))
}

/// PATCH /api/v1/titles/{id}
///
/// A `genre` list, when present, replaces the title's genres. `year` and
/// `description` set to `null` are cleared.
pub async fn update_title(
    _access: AdminOrReadOnly,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateTitle>,
) -> AppResult<Json<TitleResponse>> {
    input.validate()?;

    if !TitleRepo::exists(&state.pool, id).await? {
        return Err(CoreError::not_found("Title", id).into());
    }

    let category_id = match &input.category {
        Some(slug) => Some(resolve_category(&state, slug).await?),
        None => None,
    };
    let genre_ids = match &input.genre {
        Some(slugs) => Some(resolve_genres(&state, slugs).await?),
        None => None,
    };

    let write = TitleWrite {
        name: input.name,
        year: input.year,
        description: input.description,
        category_id,
        genre_ids,
    };
    let title = TitleRepo::update(&state.pool, id, &write)
        .await?
        .ok_or_else(|| CoreError::not_found("Title", id))?;

    tracing::info!(title_id = id, "Title updated");

    Ok(Json(title))
}

/// DELETE /api/v1/titles/{id}
///
/// Reviews of the title and their comments are deleted with it.
pub async fn delete_title(
    _access: AdminOrReadOnly,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if !TitleRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Title", id).into());
    }

    tracing::info!(title_id = id, "Title deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Slug resolution
// ---------------------------------------------------------------------------

async fn resolve_category(state: &AppState, slug: &str) -> AppResult<DbId> {
    let category = TaxonomyRepo::find_by_slug(&state.pool, Taxonomy::Category, slug)
        .await?
        .ok_or_else(|| CoreError::field("category", FieldError::UnknownSlug(slug.to_string())))?;
    Ok(category.id)
}

/// Resolve genre slugs to ids, failing on the first unknown slug.
async fn resolve_genres(state: &AppState, slugs: &[String]) -> AppResult<Vec<DbId>> {
    let found = TaxonomyRepo::find_ids_by_slugs(&state.pool, Taxonomy::Genre, slugs).await?;

    slugs
        .iter()
        .map(|slug| {
            found
                .iter()
                .find(|(s, _)| s == slug)
                .map(|(_, id)| *id)
                .ok_or_else(|| {
                    AppError::from(CoreError::field(
                        "genre",
                        FieldError::UnknownSlug(slug.clone()),
                    ))
                })
        })
        .collect()
}
