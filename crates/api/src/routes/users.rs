use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /              -> list_users (admin only)
/// POST   /              -> create_user (admin only)
/// GET    /me            -> get_me
/// PATCH  /me            -> update_me
/// GET    /{username}    -> get_user (admin only)
/// PATCH  /{username}    -> update_user (admin only)
/// DELETE /{username}    -> delete_user (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/me", get(users::get_me).patch(users::update_me))
        .route(
            "/{username}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
}
