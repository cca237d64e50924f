//! Book catalog endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

use super::{ApiKey, ValidatedJson};

/// Query parameters for the search endpoint
#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Response body for a successful cover upload
#[derive(Serialize, ToSchema)]
pub struct UploadCoverResponse {
    pub message: String,
    pub url: String,
}

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "List of books", body = Vec<Book>),
        (status = 401, description = "Invalid API key", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list().await?;
    Ok(Json(books))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("api_key" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "ISBN already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    ValidatedJson(book): ValidatedJson<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.books.create(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partially update an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "ISBN already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Path(id): Path<i32>,
    ValidatedJson(changes): ValidatedJson<UpdateBook>,
) -> AppResult<Json<Book>> {
    let updated = state.services.books.update(id, changes).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload a cover image for a book
#[utoipa::path(
    post,
    path = "/books/{id}/cover",
    tag = "books",
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Cover uploaded", body = UploadCoverResponse),
        (status = 400, description = "Missing or empty file", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn upload_cover(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadCoverResponse>> {
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            file = Some((filename, data));
        }
    }

    let (filename, data) = file.ok_or_else(|| AppError::BadRequest("No file part".to_string()))?;

    if filename.is_empty() {
        return Err(AppError::BadRequest("No selected file".to_string()));
    }

    let url = state.services.books.upload_cover(id, data).await?;

    Ok(Json(UploadCoverResponse {
        message: "Cover image uploaded successfully".to_string(),
        url,
    }))
}

/// Search books by title, author or ISBN substring
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    security(("api_key" = [])),
    params(
        ("q" = Option<String>, Query, description = "Substring to match, case-insensitive; empty matches all")
    ),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 401, description = "Invalid API key", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state
        .services
        .books
        .search(params.q.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(books))
}
