//! Domain rules for the YaMDb review service.
//!
//! Everything in this crate is pure: field validators, the role model,
//! the permission predicates evaluated per request, and the shared error
//! taxonomy. Persistence lives in `yamdb-db`, HTTP in `yamdb-api`.

pub mod de;
pub mod error;
pub mod pagination;
pub mod permissions;
pub mod roles;
pub mod types;
pub mod validators;
