pub mod auth;
pub mod categories;
pub mod genres;
pub mod health;
pub mod reviews;
pub mod titles;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                       signup (public)
/// /auth/token                                        token exchange (public)
///
/// /users                                             list, create (admin only)
/// /users/me                                          get, update own profile
/// /users/{username}                                  get, update, delete (admin only)
///
/// /categories                                        list, create
/// /categories/{slug}                                 delete
/// /genres                                            list, create
/// /genres/{slug}                                     delete
///
/// /titles                                            list (filterable), create
/// /titles/{id}                                       get, update, delete
/// /titles/{title_id}/reviews                         list, create
/// /titles/{title_id}/reviews/{review_id}             get, update, delete
/// /titles/{title_id}/reviews/{review_id}/comments    list, create
/// /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
///                                                    get, update, delete
/// ```
///
/// Trailing slashes are trimmed before routing, so `/titles/` also matches.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/categories", categories::router())
        .nest("/genres", genres::router())
        .nest("/titles", titles::router().merge(reviews::router()))
}
