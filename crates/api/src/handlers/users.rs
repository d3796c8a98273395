//! Handlers for the `/users` resource.
//!
//! User management is admin only and addresses users by username.
//! `/users/me` lets any authenticated user read and edit their own
//! profile, except for the role.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::error::CoreError;
use yamdb_core::pagination::{Page, PageRequest};
use yamdb_core::types::DbId;
use yamdb_db::models::user::{CreateUser, UpdateUser, User, UserListParams, UserResponse};
use yamdb_db::repositories::UserRepo;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::{AdminOnly, RequireAuth};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Admin management
// ---------------------------------------------------------------------------

/// GET /api/v1/users
///
/// `?search=` matches usernames case-insensitively.
pub async fn list_users(
    _admin: AdminOnly,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserListParams>,
) -> AppResult<Json<Page<UserResponse>>> {
    let page = PageRequest::new(params.page, state.config.page_size)?;
    let search = params.search.as_deref();

    let users = UserRepo::list(&state.pool, search, page).await?;
    let count = UserRepo::count(&state.pool, search).await?;

    let results = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(Page::new(results, count, page)?))
}

/// POST /api/v1/users
pub async fn create_user(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateUser>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let user = UserRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        role = %user.role,
        admin_id = admin.user_id,
        "User created",
    );

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /api/v1/users/{username}
pub async fn get_user(
    _admin: AdminOnly,
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<UserResponse>> {
    let user = find_user(&state, &username).await?;
    Ok(Json(user.into()))
}

/// PATCH /api/v1/users/{username}
pub async fn update_user(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
    AppJson(input): AppJson<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    let user = find_user(&state, &username).await?;
    input.validate()?;

    let updated = apply_update(&state, user.id, &input).await?;

    tracing::info!(user_id = updated.id, admin_id = admin.user_id, "User updated");

    Ok(Json(updated.into()))
}

/// DELETE /api/v1/users/{username}
///
/// The user's reviews and comments are deleted with them.
pub async fn delete_user(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
) -> AppResult<StatusCode> {
    if !UserRepo::delete_by_username(&state.pool, &username).await? {
        return Err(CoreError::not_found("User", &username).into());
    }

    tracing::info!(username = %username, admin_id = admin.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Self-service
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn get_me(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, caller.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", caller.user_id))?;
    Ok(Json(user.into()))
}

/// PATCH /api/v1/users/me
///
/// A `role` in the body is ignored.
pub async fn update_me(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    AppJson(input): AppJson<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    let input = input.without_role();
    input.validate()?;

    let updated = apply_update(&state, caller.user_id, &input).await?;

    tracing::info!(user_id = updated.id, "Profile updated");

    Ok(Json(updated.into()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, username: &str) -> AppResult<User> {
    let user = UserRepo::find_by_username(&state.pool, username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", username))?;
    Ok(user)
}

async fn apply_update(state: &AppState, id: DbId, input: &UpdateUser) -> AppResult<User> {
    let user = UserRepo::update(&state.pool, id, input)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;
    Ok(user)
}
