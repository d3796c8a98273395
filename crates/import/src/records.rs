//! Row shapes of the seed CSV files.
//!
//! Every file has a header row and an `id` column. Foreign keys are plain
//! ids; `author` columns hold user ids.

use std::io::Read;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use yamdb_core::roles::Role;
use yamdb_core::types::{DbId, Timestamp};
use yamdb_core::validators::{validate_email, validate_score, validate_slug, validate_username};

use crate::error::ImportError;

/// `category.csv` and `genre.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxonRecord {
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// `titles.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct TitleRecord {
    pub id: DbId,
    pub name: String,
    pub year: Option<i32>,
    pub category: Option<DbId>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `users.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: DbId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// `genre_title.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenreTitleRecord {
    pub id: DbId,
    pub title_id: DbId,
    pub genre_id: DbId,
}

/// `review.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRecord {
    pub id: DbId,
    pub title_id: DbId,
    pub text: String,
    pub author: DbId,
    pub score: i32,
    pub pub_date: Timestamp,
}

/// `comments.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentRecord {
    pub id: DbId,
    pub review_id: DbId,
    pub text: String,
    pub author: DbId,
    pub pub_date: Timestamp,
}

/// Row-level checks applied before anything is written.
pub trait Record: DeserializeOwned {
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

impl Record for TaxonRecord {
    fn check(&self) -> Result<(), String> {
        validate_slug(&self.slug).map_err(|e| format!("slug: {e}"))
    }
}

impl Record for TitleRecord {}

impl Record for UserRecord {
    fn check(&self) -> Result<(), String> {
        validate_username(&self.username).map_err(|e| format!("username: {e}"))?;
        validate_email(&self.email).map_err(|e| format!("email: {e}"))
    }
}

impl Record for GenreTitleRecord {}

impl Record for ReviewRecord {
    fn check(&self) -> Result<(), String> {
        validate_score(self.score).map_err(|e| format!("score: {e}"))
    }
}

impl Record for CommentRecord {}

/// Parse every row of `reader`, failing on the first malformed one.
///
/// `file` is only used in error messages. Line numbers count the header.
pub fn read_records<T: Record, R: Read>(
    reader: R,
    file: &'static str,
) -> Result<Vec<T>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, result) in csv_reader.deserialize::<T>().enumerate() {
        let record = result.map_err(|source| ImportError::Csv { file, source })?;
        record.check().map_err(|message| ImportError::InvalidRow {
            file,
            line: index as u64 + 2,
            message,
        })?;
        records.push(record);
    }
    Ok(records)
}
