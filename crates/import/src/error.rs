use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: {source}")]
    Csv {
        file: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{file} line {line}: {message}")]
    InvalidRow {
        file: &'static str,
        line: u64,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
