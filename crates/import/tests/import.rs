//! Integration tests for loading seed CSV data.

use assert_matches::assert_matches;
use sqlx::PgPool;
use yamdb_core::roles::Role;
use yamdb_db::models::taxonomy::{NameSlug, Taxonomy};
use yamdb_db::repositories::{TaxonomyRepo, TitleRepo, UserRepo};
use yamdb_import::{clear_all, import_dataset, import_dir, Dataset, ImportError};

const CATEGORIES: &str = "id,name,slug\n1,Фильм,movie\n2,Книга,book\n";
const GENRES: &str = "id,name,slug\n1,Драма,drama\n2,Комедия,comedy\n";
const TITLES: &str = "id,name,year,category\n\
                      1,Побег из Шоушенка,1994,1\n\
                      2,Крестный отец,1972,1\n";
const USERS: &str = "id,username,email,role,bio,first_name,last_name\n\
                     100,bingobongo,bingobongo@yamdb.fake,user,,,\n\
                     101,capt_obvious,capt_obvious@yamdb.fake,admin,,,\n\
                     102,faust,faust@yamdb.fake,moderator,,,\n";
const GENRE_TITLES: &str = "id,title_id,genre_id\n1,1,1\n2,2,1\n3,2,2\n";
const REVIEWS: &str = "id,title_id,text,author,score,pub_date\n\
                       1,1,Ещё раз пересмотрю,100,10,2019-09-24T21:08:21.567Z\n\
                       2,1,Неплохо,101,7,2019-09-24T21:08:21.567Z\n";
const COMMENTS: &str = "id,review_id,text,author,pub_date\n\
                        1,1,Согласен,102,2019-09-24T21:08:21.567Z\n";

fn seed() -> [(Dataset, &'static str); 7] {
    [
        (Dataset::Categories, CATEGORIES),
        (Dataset::Genres, GENRES),
        (Dataset::Titles, TITLES),
        (Dataset::Users, USERS),
        (Dataset::TitleGenres, GENRE_TITLES),
        (Dataset::Reviews, REVIEWS),
        (Dataset::Comments, COMMENTS),
    ]
}

async fn load_seed(pool: &PgPool) -> Vec<u64> {
    let mut conn = pool.acquire().await.unwrap();
    let mut counts = Vec::new();
    for (dataset, data) in seed() {
        counts.push(import_dataset(&mut *conn, dataset, data.as_bytes()).await.unwrap());
    }
    counts
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_seed_import(pool: PgPool) {
    let counts = load_seed(&pool).await;
    assert_eq!(counts, vec![2, 2, 2, 3, 3, 2, 1]);

    let title = TitleRepo::find_by_id(&pool, 1).await.unwrap().unwrap();
    assert_eq!(title.rating, Some(8.5));
    assert_eq!(title.category.unwrap().slug, "movie");
    assert_eq!(title.genre.len(), 1);

    let admin = UserRepo::find_by_username(&pool, "capt_obvious")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(admin.id, 101);
    assert_eq!(admin.role(), Role::Admin);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_reimport_leaves_existing_rows(pool: PgPool) {
    load_seed(&pool).await;

    let mut conn = pool.acquire().await.unwrap();
    let renamed = "id,name,slug\n1,Кино,movie\n";
    let inserted = import_dataset(&mut *conn, Dataset::Categories, renamed.as_bytes())
        .await
        .unwrap();
    assert_eq!(inserted, 0);

    let movie = TaxonomyRepo::find_by_slug(&pool, Taxonomy::Category, "movie")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(movie.fields.name, "Фильм");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_sequences_move_past_imported_ids(pool: PgPool) {
    load_seed(&pool).await;

    let created = TaxonomyRepo::create(
        &pool,
        Taxonomy::Category,
        &NameSlug {
            name: "Музыка".into(),
            slug: "music".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(created.id, 3);

    let (user, created) = UserRepo::get_or_create(&pool, "newcomer", "newcomer@yamdb.fake")
        .await
        .unwrap();
    assert!(created);
    assert_eq!(user.id, 103);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_invalid_row_aborts_dataset(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let data = "id,name,slug\n1,Фильм,movie\n2,Книга,not a slug\n";
    let result = import_dataset(&mut *conn, Dataset::Categories, data.as_bytes()).await;
    assert_matches!(result, Err(ImportError::InvalidRow { line: 3, .. }));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_clear_all(pool: PgPool) {
    load_seed(&pool).await;

    let summary = clear_all(&pool).await.unwrap();
    assert_eq!(summary.first(), Some(&(Dataset::Comments, 1)));
    assert_eq!(summary.last(), Some(&(Dataset::Categories, 2)));

    for table in ["categories", "genres", "titles", "users", "title_genres", "reviews", "comments"]
    {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "{table} should be empty");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_data_dir(pool: PgPool) {
    let result = import_dir(&pool, std::path::Path::new("/nonexistent/yamdb-data")).await;
    assert_matches!(result, Err(ImportError::Open { .. }));
}
