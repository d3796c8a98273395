use std::sync::Arc;

use yamdb_mail::Mailer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and the rest sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: yamdb_db::DbPool,
    /// Immutable server configuration.
    pub config: Arc<ServerConfig>,
    /// Outgoing mail for confirmation codes.
    pub mailer: Arc<dyn Mailer>,
}
