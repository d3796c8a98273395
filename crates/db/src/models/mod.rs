//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and partial updates, with `validate()`
//! - A `Serialize` response shape where the row itself is not exposed

pub mod authored;
pub mod comment;
pub mod review;
pub mod taxonomy;
pub mod title;
pub mod user;
