//! Books repository for database operations.
//!
//! The `books` table carries a unique index on `isbn`; concurrent creates
//! with a colliding ISBN race at that index and the loser surfaces as a
//! conflict. Timestamps are bound from a single captured instant, so a
//! freshly created row has `created_at == updated_at`.

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

/// Escape LIKE metacharacters so the bound pattern matches the literal
/// substring instead of being interpreted as a pattern.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, isbn, publish_date, description,
                   cover_image_url, created_at, updated_at
            FROM books
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Get a book by ID
    pub async fn get(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, isbn, publish_date, description,
                   cover_image_url, created_at, updated_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Create a new book. A colliding ISBN surfaces as a conflict.
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let now = Utc::now();

        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                title, author, isbn, publish_date, description,
                cover_image_url, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id, title, author, isbn, publish_date, description,
                      cover_image_url, created_at, updated_at
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.publish_date)
        .bind(&book.description)
        .bind(&book.cover_image_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("A book with ISBN {} already exists", book.isbn))
            } else {
                AppError::from(e)
            }
        })
    }

    /// Apply a partial update; only supplied fields change, `updated_at`
    /// is refreshed.
    pub async fn update(&self, id: i32, changes: &UpdateBook) -> AppResult<Book> {
        let now = Utc::now();

        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($1, title),
                author = COALESCE($2, author),
                isbn = COALESCE($3, isbn),
                publish_date = COALESCE($4, publish_date),
                description = COALESCE($5, description),
                cover_image_url = COALESCE($6, cover_image_url),
                updated_at = $7
            WHERE id = $8
            RETURNING id, title, author, isbn, publish_date, description,
                      cover_image_url, created_at, updated_at
            "#,
        )
        .bind(changes.title.as_deref())
        .bind(changes.author.as_deref())
        .bind(changes.isbn.as_deref())
        .bind(changes.publish_date)
        .bind(changes.description.as_deref())
        .bind(changes.cover_image_url.as_deref())
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                let isbn = changes.isbn.as_deref().unwrap_or_default();
                AppError::Conflict(format!("A book with ISBN {} already exists", isbn))
            } else {
                AppError::from(e)
            }
        })?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book permanently. Repeated deletes of the same id keep
    /// yielding not-found.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Case-insensitive substring search over title, author and ISBN.
    /// An empty term matches every book.
    pub async fn search(&self, term: &str) -> AppResult<Vec<Book>> {
        let pattern = like_pattern(term);

        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, isbn, publish_date, description,
                   cover_image_url, created_at, updated_at
            FROM books
            WHERE title ILIKE $1 OR author ILIKE $1 OR isbn ILIKE $1
            ORDER BY id
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Store the public cover URL for a book, refreshing `updated_at`.
    pub async fn set_cover_url(&self, id: i32, url: &str) -> AppResult<Book> {
        let now = Utc::now();

        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET cover_image_url = $1, updated_at = $2
            WHERE id = $3
            RETURNING id, title, author, isbn, publish_date, description,
                      cover_image_url, created_at, updated_at
            "#,
        )
        .bind(url)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }
}
