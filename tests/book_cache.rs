mod common;

use axum::http::{Method, StatusCode};
use bookclub::database::{BookStore, models::Book};
use serde_json::json;

use common::TestApp;

fn book_42() -> Book {
    Book {
        id: 42,
        title: "Parable of the Sower".into(),
        author_id: 9,
        isbn: "9780446675505".into(),
        publication_year: 1993,
        description: "Earthseed".into(),
    }
}

#[tokio::test]
async fn cached_snapshot_outlives_direct_store_delete() {
    let app = TestApp::new();
    app.books.seed(book_42());

    let (status, first) = app.send(Method::GET, "/api/v1/books/42", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["title"], "Parable of the Sower");
    assert_eq!(app.books.lookups(), 1);

    // 绕过接口直接删除，缓存不会失效
    app.books.delete(42).await.unwrap();

    let (status, second) = app.send(Method::GET, "/api/v1/books/42", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(app.books.lookups(), 1);
}

#[tokio::test]
async fn update_through_api_invalidates_cache() {
    let app = TestApp::new();
    app.books.seed(book_42());
    app.send(
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "username": "grace", "password": "secret" })),
    )
    .await;
    let (access, _) = app.login("grace", "secret").await;

    app.send(Method::GET, "/api/v1/books/42", None, None).await;

    let (status, updated) = app
        .send(
            Method::PUT,
            "/api/v1/books/42",
            Some(&access),
            Some(json!({ "title": "Parable of the Talents", "publication_year": 1998 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isbn"], "9780446675505");

    let (status, fetched) = app.send(Method::GET, "/api/v1/books/42", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Parable of the Talents");
    assert_eq!(fetched["publication_year"], 1998);
    assert_eq!(app.books.lookups(), 2);
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/v1/books/7", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
    assert_eq!(body["error_message"], "Book 7 not found");

    // 未找到不写缓存
    let (status, _) = app.send(Method::GET, "/api/v1/books/7", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.books.lookups(), 2);
}

#[tokio::test]
async fn list_reads_primary_store() {
    let app = TestApp::new();
    app.books.seed(book_42());

    let (status, body) = app.send(Method::GET, "/api/v1/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], 42);
}

#[tokio::test]
async fn empty_catalogue_lists_as_empty_array() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/v1/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}
