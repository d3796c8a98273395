//! Handlers for `/titles/{title_id}/reviews`.
//!
//! Anyone may read. Any authenticated user may review a title once.
//! Editing and deleting is open to the review's author, moderators and
//! admins.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::error::CoreError;
use yamdb_core::pagination::{Page, PageParams, PageRequest};
use yamdb_core::types::DbId;
use yamdb_db::models::review::{CreateReview, Review, UpdateReview};
use yamdb_db::repositories::{ReviewRepo, TitleRepo};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::AuthenticatedOrReadOnly;
use crate::state::AppState;

/// GET /api/v1/titles/{title_id}/reviews
pub async fn list_reviews(
    _access: AuthenticatedOrReadOnly,
    State(state): State<AppState>,
    AppPath(title_id): AppPath<DbId>,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<Json<Page<Review>>> {
    ensure_title(&state, title_id).await?;
    let page = PageRequest::new(params.page, state.config.page_size)?;

    let reviews = ReviewRepo::list_for_title(&state.pool, title_id, page).await?;
    let count = ReviewRepo::count_for_title(&state.pool, title_id).await?;

    Ok(Json(Page::new(reviews, count, page)?))
}

/// POST /api/v1/titles/{title_id}/reviews
///
/// The caller becomes the author. A second review of the same title by
/// the same author is rejected.
pub async fn create_review(
    AuthenticatedOrReadOnly(access): AuthenticatedOrReadOnly,
    State(state): State<AppState>,
    AppPath(title_id): AppPath<DbId>,
    AppJson(input): AppJson<CreateReview>,
) -> AppResult<impl IntoResponse> {
    let caller = access.caller()?;
    ensure_title(&state, title_id).await?;
    input.validate()?;

    // The unique constraint still catches a concurrent duplicate.
    if ReviewRepo::exists_for_author(&state.pool, title_id, caller.user_id).await? {
        return Err(CoreError::DuplicateReview { title_id }.into());
    }

    let review = ReviewRepo::create(&state.pool, title_id, caller.user_id, &input).await?;

    tracing::info!(
        review_id = review.id,
        title_id,
        user_id = caller.user_id,
        score = review.score,
        "Review created",
    );

    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn get_review(
    _access: AuthenticatedOrReadOnly,
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<Review>> {
    Ok(Json(find_review(&state, title_id, review_id).await?))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn update_review(
    AuthenticatedOrReadOnly(access): AuthenticatedOrReadOnly,
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<UpdateReview>,
) -> AppResult<Json<Review>> {
    let review = find_review(&state, title_id, review_id).await?;
    access.require_author_or_staff(review.body.author_id)?;
    input.validate()?;

    let review = ReviewRepo::update(&state.pool, title_id, review_id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", review_id))?;

    tracing::info!(review_id, title_id, "Review updated");

    Ok(Json(review))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}
///
/// Comments on the review are deleted with it.
pub async fn delete_review(
    AuthenticatedOrReadOnly(access): AuthenticatedOrReadOnly,
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let review = find_review(&state, title_id, review_id).await?;
    access.require_author_or_staff(review.body.author_id)?;

    if !ReviewRepo::delete(&state.pool, title_id, review_id).await? {
        return Err(CoreError::not_found("Review", review_id).into());
    }

    tracing::info!(review_id, title_id, "Review deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_title(state: &AppState, title_id: DbId) -> AppResult<()> {
    if !TitleRepo::exists(&state.pool, title_id).await? {
        return Err(CoreError::not_found("Title", title_id).into());
    }
    Ok(())
}

async fn find_review(state: &AppState, title_id: DbId, review_id: DbId) -> AppResult<Review> {
    ensure_title(state, title_id).await?;
    let review = ReviewRepo::find(&state.pool, title_id, review_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", review_id))?;
    Ok(review)
}
