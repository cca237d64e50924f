//! Book catalog service

use bytes::Bytes;

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

use super::storage::StorageService;

/// Object key a book's cover is stored under. Deterministic per ISBN, so a
/// re-upload overwrites the previous cover.
fn cover_object_key(isbn: &str) -> String {
    format!("{}_cover.jpg", isbn)
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    storage: StorageService,
}

impl BooksService {
    pub fn new(repository: Repository, storage: StorageService) -> Self {
        Self {
            repository,
            storage,
        }
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Get a book by ID
    pub async fn get(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get(id).await
    }

    /// Create a new book
    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        self.repository.books.create(&book).await
    }

    /// Partially update an existing book
    pub async fn update(&self, id: i32, changes: UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, &changes).await
    }

    /// Delete a book permanently
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    /// Case-insensitive substring search over title, author and ISBN
    pub async fn search(&self, term: &str) -> AppResult<Vec<Book>> {
        self.repository.books.search(term).await
    }

    /// Upload a cover image for a book and persist its public URL.
    ///
    /// Upload and persist are not atomic: if the store write succeeds but
    /// the database write fails, the object stays orphaned under the ISBN
    /// key until the next successful upload overwrites it.
    pub async fn upload_cover(&self, id: i32, data: Bytes) -> AppResult<String> {
        let book = self.repository.books.get(id).await?;

        let key = cover_object_key(&book.isbn);
        self.storage.put(&key, data).await?;

        let url = self.storage.public_url(&key);
        self.repository.books.set_cover_url(id, &url).await?;

        tracing::info!("Cover uploaded for book id={} key={}", id, key);

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::cover_object_key;

    #[test]
    fn cover_key_is_derived_from_isbn() {
        assert_eq!(cover_object_key("1234567890123"), "1234567890123_cover.jpg");
    }
}
