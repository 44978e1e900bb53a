//! In-memory book repository, used for tests and database-less local runs

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::BooksRepository;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookPatch, CreateBook},
};

#[derive(Default)]
pub struct MemoryBooksRepository {
    books: RwLock<Vec<Book>>,
}

impl MemoryBooksRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BooksRepository for MemoryBooksRepository {
    async fn find_all(&self) -> AppResult<Vec<Book>> {
        Ok(self.books.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Book> {
        self.books
            .read()
            .await
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn insert(&self, data: &CreateBook) -> AppResult<Book> {
        let book = Book {
            id: Uuid::new_v4().to_string(),
            title: data.title.clone(),
            author: data.author.clone(),
            description: data.description.clone(),
            published_date: data.published_date.clone(),
            genre: data.genre.clone(),
            pages: data.pages,
            language: data.language.clone(),
            status: data.status.clone(),
        };
        self.books.write().await.push(book.clone());
        Ok(book)
    }

    async fn update(&self, id: &str, patch: &BookPatch) -> AppResult<Book> {
        let mut books = self.books.write().await;
        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
        book.apply(patch);
        Ok(book.clone())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut books = self.books.write().await;
        let before = books.len();
        books.retain(|book| book.id != id);
        if books.len() == before {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
