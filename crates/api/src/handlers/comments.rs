//! Handlers for `/titles/{title_id}/reviews/{review_id}/comments`.
//!
//! Only the review id scopes a comment; the title id in the path is not
//! checked. Permissions match reviews.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::error::CoreError;
use yamdb_core::pagination::{Page, PageParams, PageRequest};
use yamdb_core::types::DbId;
use yamdb_db::models::comment::{Comment, CommentText};
use yamdb_db::repositories::{CommentRepo, ReviewRepo};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::AuthenticatedOrReadOnly;
use crate::state::AppState;

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn list_comments(
    _access: AuthenticatedOrReadOnly,
    State(state): State<AppState>,
    AppPath((_title_id, review_id)): AppPath<(DbId, DbId)>,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<Json<Page<Comment>>> {
    ensure_review(&state, review_id).await?;
    let page = PageRequest::new(params.page, state.config.page_size)?;

    let comments = CommentRepo::list_for_review(&state.pool, review_id, page).await?;
    let count = CommentRepo::count_for_review(&state.pool, review_id).await?;

    Ok(Json(Page::new(comments, count, page)?))
}

/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn create_comment(
    AuthenticatedOrReadOnly(access): AuthenticatedOrReadOnly,
    State(state): State<AppState>,
    AppPath((_title_id, review_id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<CommentText>,
) -> AppResult<impl IntoResponse> {
    let caller = access.caller()?;
    ensure_review(&state, review_id).await?;
    input.validate()?;

    let comment = CommentRepo::create(&state.pool, review_id, caller.user_id, &input).await?;

    tracing::info!(
        comment_id = comment.id,
        review_id,
        user_id = caller.user_id,
        "Comment created",
    );

    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment(
    _access: AuthenticatedOrReadOnly,
    State(state): State<AppState>,
    AppPath((_title_id, review_id, comment_id)): AppPath<(DbId, DbId, DbId)>,
) -> AppResult<Json<Comment>> {
    Ok(Json(find_comment(&state, review_id, comment_id).await?))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn update_comment(
    AuthenticatedOrReadOnly(access): AuthenticatedOrReadOnly,
    State(state): State<AppState>,
    AppPath((_title_id, review_id, comment_id)): AppPath<(DbId, DbId, DbId)>,
    AppJson(input): AppJson<CommentText>,
) -> AppResult<Json<Comment>> {
    let comment = find_comment(&state, review_id, comment_id).await?;
    access.require_author_or_staff(comment.body.author_id)?;
    input.validate()?;

    let comment = CommentRepo::update(&state.pool, review_id, comment_id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", comment_id))?;

    tracing::info!(comment_id, review_id, "Comment updated");

    Ok(Json(comment))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_comment(
    AuthenticatedOrReadOnly(access): AuthenticatedOrReadOnly,
    State(state): State<AppState>,
    AppPath((_title_id, review_id, comment_id)): AppPath<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    let comment = find_comment(&state, review_id, comment_id).await?;
    access.require_author_or_staff(comment.body.author_id)?;

    if !CommentRepo::delete(&state.pool, review_id, comment_id).await? {
        return Err(CoreError::not_found("Comment", comment_id).into());
    }

    tracing::info!(comment_id, review_id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_review(state: &AppState, review_id: DbId) -> AppResult<()> {
    if !ReviewRepo::exists(&state.pool, review_id).await? {
        return Err(CoreError::not_found("Review", review_id).into());
    }
    Ok(())
}

async fn find_comment(state: &AppState, review_id: DbId, comment_id: DbId) -> AppResult<Comment> {
    ensure_review(state, review_id).await?;
    let comment = CommentRepo::find(&state.pool, review_id, comment_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", comment_id))?;
    Ok(comment)
}
