use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::taxonomy;
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// GET    /          -> list_categories
/// POST   /          -> create_category (admin only)
/// DELETE /{slug}    -> delete_category (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(taxonomy::list_categories).post(taxonomy::create_category),
        )
        .route("/{slug}", delete(taxonomy::delete_category))
}
