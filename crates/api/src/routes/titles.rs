use axum::routing::get;
use axum::Router;

use crate::handlers::titles;
use crate::state::AppState;

/// Routes mounted at `/titles`.
///
/// ```text
/// GET    /        -> list_titles
/// POST   /        -> create_title (admin only)
/// GET    /{id}    -> get_title
/// PATCH  /{id}    -> update_title (admin only)
/// DELETE /{id}    -> delete_title (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(titles::list_titles).post(titles::create_title))
        .route(
            "/{id}",
            get(titles::get_title)
                .patch(titles::update_title)
                .delete(titles::delete_title),
        )
}
