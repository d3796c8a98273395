//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller behind a JWT Bearer token.
//! - [`auth::MaybeAuthUser`] -- the same, or anonymous when no token is sent.
//! - [`rbac`] -- extractors that evaluate the permission rules for a route.

pub mod auth;
pub mod rbac;
