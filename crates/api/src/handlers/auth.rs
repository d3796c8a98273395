//! Handlers for the `/auth` resource (signup, token).

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use yamdb_core::error::CoreError;
use yamdb_core::validators::{validate_email, validate_username};
use yamdb_db::repositories::UserRepo;

use crate::auth::confirmation::{check_code, make_code};
use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

const CONFIRMATION_SUBJECT: &str = "YaMDb confirmation code";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`; also echoed back on success.
#[derive(Debug, Deserialize, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
}

/// Request body for `POST /auth/token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register (or re-register) a username + email pair and mail a fresh
/// confirmation code. Repeating the same pair is allowed; reusing either
/// value with a different partner is a conflict.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignupRequest>,
) -> AppResult<Json<SignupRequest>> {
    validate_username(&input.username).map_err(|e| CoreError::field("username", e))?;
    validate_email(&input.email).map_err(|e| CoreError::field("email", e))?;

    let (user, created) = UserRepo::get_or_create(&state.pool, &input.username, &input.email).await?;
    if created {
        tracing::info!(user_id = user.id, username = %user.username, "User signed up");
    }

    let code = make_code(&user, &state.config.confirmation, Utc::now().timestamp());
    let body = format!(
        "Hello, {}!\n\nYour confirmation code: {code}\n\n\
         Exchange it for an access token at /api/v1/auth/token/.",
        user.username
    );
    if let Err(e) = state
        .mailer
        .send(&user.email, CONFIRMATION_SUBJECT, &body)
        .await
    {
        tracing::error!(user_id = user.id, error = %e, "Failed to send confirmation code");
    }

    Ok(Json(SignupRequest {
        username: user.username,
        email: user.email,
    }))
}

/// POST /api/v1/auth/token
///
/// Exchange a confirmation code for a bearer token. Stamps `last_login`,
/// which invalidates the code just used and any other outstanding ones.
pub async fn token(
    State(state): State<AppState>,
    AppJson(input): AppJson<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &input.username))?;

    let now = Utc::now().timestamp();
    if !check_code(&user, &input.confirmation_code, &state.config.confirmation, now) {
        tracing::info!(user_id = user.id, "Rejected confirmation code");
        return Err(CoreError::InvalidConfirmationCode.into());
    }

    UserRepo::record_login(&state.pool, user.id).await?;

    let token = generate_access_token(user.id, user.role().as_str(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "Access token issued");

    Ok(Json(TokenResponse { token }))
}
