//! Loading seed CSV files into the database, and clearing them out again.
//!
//! Rows keep the `id` from the file. Rows whose id already exists are left
//! untouched, so importing the same directory twice is harmless. After each
//! file the table's id sequence is moved past the highest id so rows
//! created later through the API do not collide.

use std::path::Path;

use sqlx::{PgConnection, PgPool};

use crate::error::ImportError;
use crate::records::{
    read_records, CommentRecord, GenreTitleRecord, ReviewRecord, TaxonRecord, TitleRecord,
    UserRecord,
};

/// One seed file and the table it fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Categories,
    Genres,
    Titles,
    Users,
    TitleGenres,
    Reviews,
    Comments,
}

impl Dataset {
    /// Every dataset, parents before children.
    pub const ALL: [Dataset; 7] = [
        Dataset::Categories,
        Dataset::Genres,
        Dataset::Titles,
        Dataset::Users,
        Dataset::TitleGenres,
        Dataset::Reviews,
        Dataset::Comments,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Dataset::Categories => "category.csv",
            Dataset::Genres => "genre.csv",
            Dataset::Titles => "titles.csv",
            Dataset::Users => "users.csv",
            Dataset::TitleGenres => "genre_title.csv",
            Dataset::Reviews => "review.csv",
            Dataset::Comments => "comments.csv",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            Dataset::Categories => "categories",
            Dataset::Genres => "genres",
            Dataset::Titles => "titles",
            Dataset::Users => "users",
            Dataset::TitleGenres => "title_genres",
            Dataset::Reviews => "reviews",
            Dataset::Comments => "comments",
        }
    }
}

/// Import every file from `data_dir` in a single transaction.
///
/// Returns the number of rows inserted per dataset.
pub async fn import_dir(
    pool: &PgPool,
    data_dir: &Path,
) -> Result<Vec<(Dataset, u64)>, ImportError> {
    let mut tx = pool.begin().await?;
    let mut summary = Vec::with_capacity(Dataset::ALL.len());

    for dataset in Dataset::ALL {
        let path = data_dir.join(dataset.file_name());
        tracing::info!(file = %path.display(), "Importing");

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| ImportError::Open {
                path: path.clone(),
                source,
            })?;
        let inserted = import_dataset(&mut *tx, dataset, bytes.as_slice()).await?;

        tracing::info!(file = dataset.file_name(), inserted, "Imported");
        summary.push((dataset, inserted));
    }

    tx.commit().await?;
    Ok(summary)
}

/// Parse one dataset from `reader` and insert its rows.
///
/// Every row is validated before the first insert.
pub async fn import_dataset<R: std::io::Read>(
    conn: &mut PgConnection,
    dataset: Dataset,
    reader: R,
) -> Result<u64, ImportError> {
    let file = dataset.file_name();
    let inserted = match dataset {
        Dataset::Categories | Dataset::Genres => {
            let records = read_records::<TaxonRecord, _>(reader, file)?;
            insert_taxa(conn, dataset.table(), &records).await?
        }
        Dataset::Titles => {
            let records = read_records::<TitleRecord, _>(reader, file)?;
            insert_titles(conn, &records).await?
        }
        Dataset::Users => {
            let records = read_records::<UserRecord, _>(reader, file)?;
            insert_users(conn, &records).await?
        }
        Dataset::TitleGenres => {
            let records = read_records::<GenreTitleRecord, _>(reader, file)?;
            insert_title_genres(conn, &records).await?
        }
        Dataset::Reviews => {
            let records = read_records::<ReviewRecord, _>(reader, file)?;
            insert_reviews(conn, &records).await?
        }
        Dataset::Comments => {
            let records = read_records::<CommentRecord, _>(reader, file)?;
            insert_comments(conn, &records).await?
        }
    };

    advance_sequence(conn, dataset.table()).await?;
    Ok(inserted)
}

/// Delete every imported row, children first.
///
/// Returns the number of rows deleted per dataset.
pub async fn clear_all(pool: &PgPool) -> Result<Vec<(Dataset, u64)>, ImportError> {
    let mut tx = pool.begin().await?;
    let mut summary = Vec::with_capacity(Dataset::ALL.len());

    for dataset in Dataset::ALL.into_iter().rev() {
        let query = format!("DELETE FROM {}", dataset.table());
        let deleted = sqlx::query(&query).execute(&mut *tx).await?.rows_affected();

        tracing::info!(table = dataset.table(), deleted, "Cleared");
        summary.push((dataset, deleted));
    }

    tx.commit().await?;
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Inserts
// ---------------------------------------------------------------------------

async fn insert_taxa(
    conn: &mut PgConnection,
    table: &str,
    records: &[TaxonRecord],
) -> Result<u64, sqlx::Error> {
    let query = format!(
        "INSERT INTO {table} (id, name, slug) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING"
    );
    let mut inserted = 0;
    for record in records {
        inserted += sqlx::query(&query)
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.slug)
            .execute(&mut *conn)
            .await?
            .rows_affected();
    }
    Ok(inserted)
}

async fn insert_titles(
    conn: &mut PgConnection,
    records: &[TitleRecord],
) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    for record in records {
        inserted += sqlx::query(
            "INSERT INTO titles (id, name, year, description, category_id)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(record.year)
        .bind(record.description.as_deref())
        .bind(record.category)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn insert_users(
    conn: &mut PgConnection,
    records: &[UserRecord],
) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    for record in records {
        inserted += sqlx::query(
            "INSERT INTO users (id, username, email, role, bio, first_name, last_name)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(record.id)
        .bind(&record.username)
        .bind(&record.email)
        .bind(record.role.as_str())
        .bind(&record.bio)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn insert_title_genres(
    conn: &mut PgConnection,
    records: &[GenreTitleRecord],
) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    for record in records {
        // Skips both a known id and a pair that is already linked.
        inserted += sqlx::query(
            "INSERT INTO title_genres (id, title_id, genre_id)
             VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING",
        )
        .bind(record.id)
        .bind(record.title_id)
        .bind(record.genre_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn insert_reviews(
    conn: &mut PgConnection,
    records: &[ReviewRecord],
) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    for record in records {
        inserted += sqlx::query(
            "INSERT INTO reviews (id, title_id, author_id, text, score, pub_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(record.id)
        .bind(record.title_id)
        .bind(record.author)
        .bind(&record.text)
        .bind(record.score)
        .bind(record.pub_date)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn insert_comments(
    conn: &mut PgConnection,
    records: &[CommentRecord],
) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    for record in records {
        inserted += sqlx::query(
            "INSERT INTO comments (id, review_id, author_id, text, pub_date)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(record.id)
        .bind(record.review_id)
        .bind(record.author)
        .bind(&record.text)
        .bind(record.pub_date)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

/// Point the table's id sequence at `MAX(id) + 1`.
async fn advance_sequence(conn: &mut PgConnection, table: &str) -> Result<(), sqlx::Error> {
    let query = format!(
        "SELECT setval(pg_get_serial_sequence('{table}', 'id'), COALESCE(MAX(id), 0) + 1, false) \
         FROM {table}"
    );
    sqlx::query(&query).execute(&mut *conn).await?;
    Ok(())
}
