//! Repository layer for book persistence

pub mod books;
pub mod memory;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::book::{Book, BookPatch, CreateBook},
};

pub use books::PgBooksRepository;
pub use memory::MemoryBooksRepository;

/// Persistence operations over book records.
///
/// Missing records are reported as [`crate::error::AppError::NotFound`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksRepository: Send + Sync {
    /// All books in insertion order
    async fn find_all(&self) -> AppResult<Vec<Book>>;

    async fn find_by_id(&self, id: &str) -> AppResult<Book>;

    /// Insert a book with exactly the given values; the store assigns the id
    async fn insert(&self, data: &CreateBook) -> AppResult<Book>;

    /// Apply the fields present in `patch`, leaving the others untouched
    async fn update(&self, id: &str, patch: &BookPatch) -> AppResult<Book>;

    async fn delete(&self, id: &str) -> AppResult<()>;

    /// Check that the store is reachable
    async fn ping(&self) -> AppResult<()>;
}
