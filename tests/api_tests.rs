//! API integration tests
//!
//! Run against a live server with a fresh database:
//! `cargo test -- --ignored`

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";
const API_KEY: &str = "change-this-api-key-in-production";

/// A 13-digit ISBN unique to this test run
fn unique_isbn() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{:013}", nanos % 10_000_000_000_000)
}

async fn create_book(client: &Client, title: &str, author: &str, isbn: &str) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("X-API-Key", API_KEY)
        .json(&json!({
            "title": title,
            "author": author,
            "isbn": isbn,
            "publish_date": "2023-05-01",
            "description": "A test book description"
        }))
        .send()
        .await
        .expect("Failed to send create request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse create response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_missing_api_key_is_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Invalid API key");
}

#[tokio::test]
#[ignore]
async fn test_wrong_api_key_is_rejected_on_every_endpoint() {
    let client = Client::new();

    let get = client
        .get(format!("{}/books", BASE_URL))
        .header("X-API-Key", "wrong-key")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(get.status(), 401);

    let post = client
        .post(format!("{}/books", BASE_URL))
        .header("X-API-Key", "wrong-key")
        .json(&json!({"title": "x"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(post.status(), 401);

    let delete = client
        .delete(format!("{}/books/1", BASE_URL))
        .header("X-API-Key", "wrong-key")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(delete.status(), 401);

    let search = client
        .get(format!("{}/books/search?q=x", BASE_URL))
        .header("X-API-Key", "wrong-key")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(search.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_create_book_assigns_id_and_timestamps() {
    let client = Client::new();

    let book = create_book(&client, "Test Book", "Test Author", &unique_isbn()).await;

    assert!(book["id"].is_number());
    assert_eq!(book["title"], "Test Book");
    assert_eq!(book["created_at"], book["updated_at"]);
}

#[tokio::test]
#[ignore]
async fn test_create_with_invalid_payload_reports_every_violation() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("X-API-Key", API_KEY)
        .json(&json!({
            "title": "",
            "author": "Test Author",
            "isbn": "42",
            "publish_date": "2023-05-01"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["details"]["title"].is_string());
    assert!(body["details"]["isbn"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_create_rejects_system_managed_fields() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("X-API-Key", API_KEY)
        .json(&json!({
            "id": 12345,
            "title": "Test Book",
            "author": "Test Author",
            "isbn": unique_isbn(),
            "publish_date": "2023-05-01"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_yields_conflict() {
    let client = Client::new();
    let isbn = unique_isbn();

    create_book(&client, "First Copy", "Test Author", &isbn).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("X-API-Key", API_KEY)
        .json(&json!({
            "title": "Second Copy",
            "author": "Test Author",
            "isbn": isbn,
            "publish_date": "2023-05-01"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_get_nonexistent_book() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books/999999", BASE_URL))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_partial_update_changes_only_supplied_fields() {
    let client = Client::new();

    let book = create_book(&client, "Original Title", "Original Author", &unique_isbn()).await;
    let id = book["id"].as_i64().expect("No book ID");

    let response = client
        .put(format!("{}/books/{}", BASE_URL, id))
        .header("X-API-Key", API_KEY)
        .json(&json!({ "description": "Updated description" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["title"], "Original Title");
    assert_eq!(updated["author"], "Original Author");
    assert_eq!(updated["isbn"], book["isbn"]);
    assert_eq!(updated["description"], "Updated description");
    assert_eq!(updated["created_at"], book["created_at"]);

    let before = chrono::DateTime::parse_from_rfc3339(book["updated_at"].as_str().unwrap())
        .expect("Invalid updated_at");
    let after = chrono::DateTime::parse_from_rfc3339(updated["updated_at"].as_str().unwrap())
        .expect("Invalid updated_at");
    assert!(after > before, "updated_at must strictly increase");
}

#[tokio::test]
#[ignore]
async fn test_update_nonexistent_book() {
    let client = Client::new();

    let response = client
        .put(format!("{}/books/999999", BASE_URL))
        .header("X-API-Key", API_KEY)
        .json(&json!({ "title": "New Title" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_delete_then_get_yields_not_found() {
    let client = Client::new();

    let book = create_book(&client, "Doomed Book", "Test Author", &unique_isbn()).await;
    let id = book["id"].as_i64().expect("No book ID");

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, id))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    // Repeated delete keeps yielding not-found
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, id))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_search_books() {
    let client = Client::new();

    create_book(&client, "Python Programming", "John Doe", &unique_isbn()).await;

    let response = client
        .get(format!("{}/books/search?q=Python", BASE_URL))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let data: Value = response.json().await.expect("Failed to parse response");
    let books = data.as_array().expect("Expected an array");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "Python Programming");
}

#[tokio::test]
#[ignore]
async fn test_search_is_case_insensitive_and_covers_author_and_isbn() {
    let client = Client::new();
    let isbn = unique_isbn();

    create_book(&client, "Obscure Treatise", "Maria Quixote", &isbn).await;

    let by_author = client
        .get(format!("{}/books/search?q=quixote", BASE_URL))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .expect("Failed to send request")
        .json::<Value>()
        .await
        .expect("Failed to parse response");
    assert!(by_author
        .as_array()
        .expect("Expected an array")
        .iter()
        .any(|b| b["isbn"] == isbn.as_str()));

    let by_isbn = client
        .get(format!("{}/books/search?q={}", BASE_URL, &isbn[3..9]))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .expect("Failed to send request")
        .json::<Value>()
        .await
        .expect("Failed to parse response");
    assert!(by_isbn
        .as_array()
        .expect("Expected an array")
        .iter()
        .any(|b| b["isbn"] == isbn.as_str()));
}

#[tokio::test]
#[ignore]
async fn test_empty_search_returns_all_books() {
    let client = Client::new();

    create_book(&client, "Empty Search Fixture", "Test Author", &unique_isbn()).await;

    let all: Value = client
        .get(format!("{}/books", BASE_URL))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let searched: Value = client
        .get(format!("{}/books/search?q=", BASE_URL))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(
        all.as_array().expect("Expected an array").len(),
        searched.as_array().expect("Expected an array").len()
    );
}

#[tokio::test]
#[ignore]
async fn test_upload_without_file_part() {
    let client = Client::new();

    let book = create_book(&client, "Coverless Book", "Test Author", &unique_isbn()).await;
    let id = book["id"].as_i64().expect("No book ID");

    let form = reqwest::multipart::Form::new().text("note", "not a file");

    let response = client
        .post(format!("{}/books/{}/cover", BASE_URL, id))
        .header("X-API-Key", API_KEY)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "No file part");
}

#[tokio::test]
#[ignore]
async fn test_upload_with_empty_filename() {
    let client = Client::new();

    let book = create_book(&client, "Unnamed Cover Book", "Test Author", &unique_isbn()).await;
    let id = book["id"].as_i64().expect("No book ID");

    let part = reqwest::multipart::Part::bytes(vec![0xFF, 0xD8, 0xFF]).file_name("");
    let form = reqwest::multipart::Form::new().part("file", part);

    let response = client
        .post(format!("{}/books/{}/cover", BASE_URL, id))
        .header("X-API-Key", API_KEY)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "No selected file");
}
