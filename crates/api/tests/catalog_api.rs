//! HTTP-level integration tests for categories, genres and titles.

mod common;

use axum::http::StatusCode;
use chrono::Datelike;
use common::{
    body_json, delete_auth, get, patch_json_auth, post_json, post_json_auth, user_token,
};
use serde_json::json;
use sqlx::PgPool;
use yamdb_core::roles::Role;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_taxonomy(app: &common::App, token: &str) {
    for (name, slug) in [("Film", "film"), ("Book", "book")] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/categories/",
            json!({ "name": name, "slug": slug }),
            token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    for (name, slug) in [("Drama", "drama"), ("Sci-fi", "sci-fi")] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/genres/",
            json!({ "name": name, "slug": slug }),
            token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

async fn create_title(app: &common::App, token: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_json_auth(app.clone(), "/api/v1/titles/", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Categories and genres
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_taxonomy_write_permissions(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let user = user_token(&pool, "reader", Role::User).await;
    let moderator = user_token(&pool, "mod", Role::Moderator).await;
    let admin = user_token(&pool, "admin", Role::Admin).await;
    let body = json!({ "name": "Film", "slug": "film" });

    let response = post_json(app.clone(), "/api/v1/categories/", body.clone()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    for token in [&user, &moderator] {
        let response =
            post_json_auth(app.clone(), "/api/v1/categories/", body.clone(), token).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    let response = post_json_auth(app.clone(), "/api/v1/categories/", body, &admin).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await,
        json!({ "name": "Film", "slug": "film" })
    );

    // Reads are public.
    let response = get(app, "/api/v1/categories/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["count"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_taxonomy_validation_and_duplicates(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let admin = user_token(&pool, "admin", Role::Admin).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/genres/",
        json!({ "name": "Drama", "slug": "drama & more" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "slug");

    let body = json!({ "name": "Drama", "slug": "drama" });
    let response = post_json_auth(app.clone(), "/api/v1/genres/", body.clone(), &admin).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json_auth(app, "/api/v1/genres/", body, &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_taxonomy_search(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let admin = user_token(&pool, "admin", Role::Admin).await;
    seed_taxonomy(&app, &admin).await;

    let response = get(app.clone(), "/api/v1/genres/?search=SCI").await;
    let json = body_json(response).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["slug"], "sci-fi");

    for uri in ["/api/v1/categories/?search=_", "/api/v1/categories/?search=%25"] {
        let json = body_json(get(app.clone(), uri).await).await;
        assert_eq!(json["count"], 0, "{uri}");
    }

    let json = body_json(get(app, "/api/v1/categories/?search=").await).await;
    assert_eq!(json["count"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_category_keeps_titles(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let admin = user_token(&pool, "admin", Role::Admin).await;
    seed_taxonomy(&app, &admin).await;

    let title = create_title(
        &app,
        &admin,
        json!({ "name": "Solaris", "year": 1972, "category": "film", "genre": ["drama"] }),
    )
    .await;

    let response = delete_auth(app.clone(), "/api/v1/categories/film/", &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app.clone(), "/api/v1/categories/film/", &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app, &format!("/api/v1/titles/{}/", title["id"])).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["category"].is_null());
    assert_eq!(json["genre"][0]["slug"], "drama");
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_title_read_shape(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let admin = user_token(&pool, "admin", Role::Admin).await;
    seed_taxonomy(&app, &admin).await;

    let created = create_title(
        &app,
        &admin,
        json!({
            "name": "Solaris",
            "year": 1972,
            "description": "Ocean planet",
            "category": "film",
            "genre": ["sci-fi", "drama"]
        }),
    )
    .await;

    assert_eq!(created["name"], "Solaris");
    assert_eq!(created["year"], 1972);
    assert!(created["rating"].is_null());
    assert_eq!(created["category"], json!({ "name": "Film", "slug": "film" }));
    assert_eq!(
        created["genre"],
        json!([
            { "name": "Drama", "slug": "drama" },
            { "name": "Sci-fi", "slug": "sci-fi" }
        ])
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_title_create_validation(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let admin = user_token(&pool, "admin", Role::Admin).await;
    seed_taxonomy(&app, &admin).await;

    let next_year = chrono::Local::now().year() + 1;
    let response = post_json_auth(
        app.clone(),
        "/api/v1/titles/",
        json!({ "name": "Later", "year": next_year, "category": "film" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "year");

    let response = post_json_auth(
        app.clone(),
        "/api/v1/titles/",
        json!({ "name": "Solaris", "category": "film", "genre": ["drama", "western"] }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["field"], "genre");
    assert!(json["error"].as_str().unwrap().contains("western"));

    let response = post_json_auth(
        app.clone(),
        "/api/v1/titles/",
        json!({ "name": "Solaris", "category": "opera" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "category");

    // Category is required on create.
    let response = post_json_auth(
        app,
        "/api/v1/titles/",
        json!({ "name": "Solaris" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_title_update_and_delete(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let admin = user_token(&pool, "admin", Role::Admin).await;
    let user = user_token(&pool, "reader", Role::User).await;
    seed_taxonomy(&app, &admin).await;

    let created = create_title(
        &app,
        &admin,
        json!({ "name": "Solaris", "year": 1961, "category": "book", "genre": ["sci-fi"] }),
    )
    .await;
    let uri = format!("/api/v1/titles/{}/", created["id"]);

    let response = patch_json_auth(app.clone(), &uri, json!({ "name": "Solaris!" }), &user).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(
        app.clone(),
        &uri,
        json!({ "category": "film", "genre": ["drama"] }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Solaris");
    assert_eq!(json["year"], 1961);
    assert_eq!(json["category"]["slug"], "film");
    assert_eq!(json["genre"], json!([{ "name": "Drama", "slug": "drama" }]));

    let response = delete_auth(app.clone(), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = patch_json_auth(app, &uri, json!({ "name": "Ghost" }), &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_title_patch_null_clears_year_and_description(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let admin = user_token(&pool, "admin", Role::Admin).await;
    seed_taxonomy(&app, &admin).await;

    let created = create_title(
        &app,
        &admin,
        json!({ "name": "Solaris", "year": 1972, "description": "d", "category": "film" }),
    )
    .await;
    let uri = format!("/api/v1/titles/{}/", created["id"]);

    // Fields left out keep their value.
    let response = patch_json_auth(app.clone(), &uri, json!({ "name": "Solaris" }), &admin).await;
    let json = body_json(response).await;
    assert_eq!(json["year"], 1972);
    assert_eq!(json["description"], "d");

    let response = patch_json_auth(
        app.clone(),
        &uri,
        json!({ "year": null, "description": null }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["year"].is_null());
    assert!(json["description"].is_null());
    assert_eq!(json["category"]["slug"], "film");

    let json = body_json(get(app, &uri).await).await;
    assert!(json["year"].is_null());
    assert!(json["description"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_title_filters_and_ordering(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let admin = user_token(&pool, "admin", Role::Admin).await;
    seed_taxonomy(&app, &admin).await;

    for (name, year, category, genre) in [
        ("Solaris", 1961, "book", "sci-fi"),
        ("Solaris", 1972, "film", "sci-fi"),
        ("Mirror", 1975, "film", "drama"),
        ("Roadside Picnic", 1972, "book", "sci-fi"),
    ] {
        create_title(
            &app,
            &admin,
            json!({ "name": name, "year": year, "category": category, "genre": [genre] }),
        )
        .await;
    }

    let json = body_json(get(app.clone(), "/api/v1/titles/?name=sol").await).await;
    assert_eq!(json["count"], 2);

    let json = body_json(get(app.clone(), "/api/v1/titles/?year=1972").await).await;
    assert_eq!(json["count"], 2);

    let json =
        body_json(get(app.clone(), "/api/v1/titles/?category=book&genre=sci-fi").await).await;
    assert_eq!(json["count"], 2);

    let json = body_json(get(app.clone(), "/api/v1/titles/?genre=drama").await).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["name"], "Mirror");

    let json = body_json(get(app.clone(), "/api/v1/titles/?ordering=-year").await).await;
    let years: Vec<_> = json["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["year"].as_i64().unwrap())
        .collect();
    assert_eq!(years, vec![1975, 1972, 1972, 1961]);

    let json = body_json(get(app.clone(), "/api/v1/titles/?name=_").await).await;
    assert_eq!(json["count"], 0);

    let response = get(app, "/api/v1/titles/?ordering=description").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_empty_title_filters_are_ignored(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let admin = user_token(&pool, "admin", Role::Admin).await;
    seed_taxonomy(&app, &admin).await;
    create_title(&app, &admin, json!({ "name": "Solaris", "year": 1972, "category": "film" }))
        .await;

    for uri in [
        "/api/v1/titles/?category=",
        "/api/v1/titles/?year=",
        "/api/v1/titles/?name=&genre=&ordering=&page=",
    ] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(body_json(response).await["count"], 1, "{uri}");
    }

    let response = get(app, "/api/v1/titles/?year=soon").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_non_numeric_title_id_is_json_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    for uri in [
        "/api/v1/titles/abc/",
        "/api/v1/titles/abc/reviews/",
        "/api/v1/titles/1/reviews/x/comments/",
    ] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body_json(response).await["code"], "NOT_FOUND", "{uri}");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_title_pagination(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let admin = user_token(&pool, "admin", Role::Admin).await;
    seed_taxonomy(&app, &admin).await;

    // Test page size is 5.
    for i in 0..7 {
        create_title(
            &app,
            &admin,
            json!({ "name": format!("Title {i}"), "category": "film" }),
        )
        .await;
    }

    let json = body_json(get(app.clone(), "/api/v1/titles/").await).await;
    assert_eq!(json["count"], 7);
    assert_eq!(json["results"].as_array().unwrap().len(), 5);
    assert_eq!(json["next"], 2);
    assert!(json["previous"].is_null());

    let json = body_json(get(app.clone(), "/api/v1/titles/?page=2").await).await;
    assert_eq!(json["results"].as_array().unwrap().len(), 2);
    assert!(json["next"].is_null());
    assert_eq!(json["previous"], 1);

    let response = get(app, "/api/v1/titles/?page=3").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Invalid page");
}
