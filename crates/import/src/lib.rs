//! Bulk loading of seed data from CSV files.

pub mod error;
pub mod loader;
pub mod records;

pub use error::ImportError;
pub use loader::{clear_all, import_dataset, import_dir, Dataset};
