//! Permission extractors.
//!
//! Each extractor resolves the (optional) caller, evaluates one of the
//! rules in [`yamdb_core::permissions`] against the request method, and
//! rejects with 401 when no credentials were sent or 403 otherwise.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use yamdb_core::error::CoreError;
use yamdb_core::permissions::{self, AccessRequest, Caller, Denial};
use yamdb_core::types::DbId;

use super::auth::MaybeAuthUser;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Who is calling and whether the method is safe. Handlers use it for
/// object-level checks once the target row is loaded.
#[derive(Debug, Clone)]
pub struct Access {
    pub caller: Option<Caller>,
    safe_method: bool,
}

impl Access {
    fn request(&self) -> AccessRequest<'_> {
        AccessRequest {
            caller: self.caller.as_ref(),
            safe_method: self.safe_method,
        }
    }

    /// Evaluate `rule`, mapping a refusal to 401 or 403.
    pub fn require(&self, rule: impl FnOnce(&AccessRequest<'_>) -> bool) -> AppResult<()> {
        permissions::check(&self.request(), rule).map_err(denied)
    }

    /// Object-level check for reviews and comments written by `author_id`.
    pub fn require_author_or_staff(&self, author_id: DbId) -> AppResult<()> {
        self.require(|req| permissions::is_admin_moderator_author_or_read_only(req, author_id))
    }

    /// The caller, or 401 for anonymous requests.
    pub fn caller(&self) -> AppResult<&Caller> {
        self.caller.as_ref().ok_or_else(|| denied(Denial::NotAuthenticated))
    }
}

fn denied(denial: Denial) -> AppError {
    match denial {
        Denial::NotAuthenticated => AppError::Core(CoreError::Unauthorized(
            "Authentication credentials were not provided".into(),
        )),
        Denial::PermissionDenied => AppError::Core(CoreError::Forbidden(
            "You do not have permission to perform this action".into(),
        )),
    }
}

async fn access_for(parts: &mut Parts, state: &AppState) -> AppResult<Access> {
    let MaybeAuthUser(caller) = MaybeAuthUser::from_request_parts(parts, state).await?;
    Ok(Access {
        caller,
        safe_method: permissions::is_safe_method(parts.method.as_str()),
    })
}

/// Admins (role `admin` or staff) only, for every method.
pub struct AdminOnly(pub Caller);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let access = access_for(parts, state).await?;
        access.require(permissions::admin_only)?;
        Ok(AdminOnly(access.caller()?.clone()))
    }
}

/// Anyone may read; only admins may write.
pub struct AdminOrReadOnly(pub Access);

impl FromRequestParts<AppState> for AdminOrReadOnly {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let access = access_for(parts, state).await?;
        access.require(permissions::is_admin_or_read_only)?;
        Ok(AdminOrReadOnly(access))
    }
}

/// Anyone may read; any authenticated caller may write. Object-level
/// checks follow in the handler via [`Access::require_author_or_staff`].
pub struct AuthenticatedOrReadOnly(pub Access);

impl FromRequestParts<AppState> for AuthenticatedOrReadOnly {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let access = access_for(parts, state).await?;
        access.require(permissions::authenticated_or_read_only)?;
        Ok(AuthenticatedOrReadOnly(access))
    }
}

/// Any authenticated caller, for every method.
pub struct RequireAuth(pub Caller);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let access = access_for(parts, state).await?;
        access.require(permissions::authenticated)?;
        Ok(RequireAuth(access.caller()?.clone()))
    }
}
