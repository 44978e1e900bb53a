//! Book catalog service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookPatch, CreateBook, REQUIRED_FIELDS_MESSAGE},
    repository::BooksRepository,
};

const BOOK_ID_REQUIRED: &str = "Book ID is required";
const BOOK_NOT_FOUND: &str = "Book not found";
const NO_VALID_FIELDS: &str = "no valid fields provided";
const UPDATE_FAILED: &str = "failed to update book";

#[derive(Clone)]
pub struct BooksService {
    repository: Arc<dyn BooksRepository>,
}

impl BooksService {
    pub fn new(repository: Arc<dyn BooksRepository>) -> Self {
        Self { repository }
    }

    /// List every book
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = self.repository.find_all().await?;
        tracing::debug!(count = books.len(), "listed books");
        Ok(books)
    }

    /// Get a book by ID. Every lookup failure is reported as not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<Book> {
        require_id(id)?;
        self.repository.find_by_id(id).await.map_err(|e| {
            tracing::debug!(book_id = %id, "book lookup failed: {}", e);
            AppError::NotFound(BOOK_NOT_FOUND.to_string())
        })
    }

    /// Create a book once all eight fields are present
    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        data.validate()
            .map_err(|_| AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()))?;

        let book = self.repository.insert(data).await?;
        tracing::info!(book_id = %book.id, title = %book.title, "book created");
        Ok(book)
    }

    /// Apply the qualifying fields of `patch` to an existing book
    pub async fn update(&self, id: &str, patch: &BookPatch) -> AppResult<Book> {
        require_id(id)?;

        if patch.is_empty() {
            // An unknown id stays a 404 whatever the payload holds
            self.repository
                .find_by_id(id)
                .await
                .map_err(classify_update_error)?;
            return Err(AppError::BadRequest(NO_VALID_FIELDS.to_string()));
        }

        let book = self
            .repository
            .update(id, patch)
            .await
            .map_err(classify_update_error)?;
        tracing::info!(book_id = %book.id, fields = ?patch.field_names(), "book updated");
        Ok(book)
    }

    /// Delete a book. Every failure is reported as not found.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        require_id(id)?;
        self.repository.delete(id).await.map_err(|e| {
            tracing::debug!(book_id = %id, "book delete failed: {}", e);
            AppError::NotFound(BOOK_NOT_FOUND.to_string())
        })?;
        tracing::info!(book_id = %id, "book deleted");
        Ok(())
    }

    /// Readiness of the persistence layer
    pub async fn ping(&self) -> AppResult<()> {
        self.repository
            .ping()
            .await
            .map_err(|e| AppError::Unavailable(e.to_string()))
    }
}

fn require_id(id: &str) -> AppResult<()> {
    if id.is_empty() {
        return Err(AppError::BadRequest(BOOK_ID_REQUIRED.to_string()));
    }
    Ok(())
}

fn classify_update_error(e: AppError) -> AppError {
    if e.is_not_found() {
        AppError::NotFound(BOOK_NOT_FOUND.to_string())
    } else {
        tracing::error!("book update failed: {}", e);
        AppError::Internal(UPDATE_FAILED.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockBooksRepository;
    use axum::{http::StatusCode, response::IntoResponse};

    fn dune() -> Book {
        Book {
            id: "b1".to_string(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            description: "Desert planet saga".to_string(),
            published_date: "1965-08-01".to_string(),
            genre: "SciFi".to_string(),
            pages: 412,
            language: "en".to_string(),
            status: "available".to_string(),
        }
    }

    fn service(mock: MockBooksRepository) -> BooksService {
        BooksService::new(Arc::new(mock))
    }

    fn pages_patch(pages: i32) -> BookPatch {
        BookPatch {
            pages: Some(pages),
            ..BookPatch::default()
        }
    }

    #[tokio::test]
    async fn empty_id_is_rejected_before_the_store() {
        let svc = service(MockBooksRepository::new());

        for err in [
            svc.get_by_id("").await.unwrap_err(),
            svc.update("", &pages_patch(10)).await.unwrap_err(),
            svc.delete("").await.unwrap_err(),
        ] {
            match err {
                AppError::BadRequest(msg) => assert_eq!(msg, "Book ID is required"),
                other => panic!("expected bad request, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn get_collapses_any_store_failure_into_not_found() {
        let mut mock = MockBooksRepository::new();
        mock.expect_find_by_id()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        match service(mock).get_by_id("b1").await.unwrap_err() {
            AppError::NotFound(msg) => assert_eq!(msg, "Book not found"),
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_with_a_missing_field_never_reaches_the_store() {
        let mut mock = MockBooksRepository::new();
        mock.expect_insert().never();

        let data = CreateBook {
            title: "Dune".to_string(),
            pages: 412,
            ..CreateBook::default()
        };
        match service(mock).create(&data).await.unwrap_err() {
            AppError::Validation(msg) => assert_eq!(msg, REQUIRED_FIELDS_MESSAGE),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_passes_store_errors_through() {
        let mut mock = MockBooksRepository::new();
        mock.expect_insert()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolClosed)));

        let data = CreateBook {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            description: "Desert planet saga".to_string(),
            published_date: "1965-08-01".to_string(),
            genre: "SciFi".to_string(),
            pages: 412,
            language: "en".to_string(),
            status: "whatever".to_string(),
        };
        let err = service(mock).create(&data).await.unwrap_err();
        assert!(matches!(err, AppError::Database(sqlx::Error::PoolClosed)));
    }

    #[tokio::test]
    async fn list_passes_store_errors_through_as_500() {
        let mut mock = MockBooksRepository::new();
        mock.expect_find_all()
            .times(1)
            .returning(|| Err(AppError::Database(sqlx::Error::PoolClosed)));

        let err = service(mock).list().await.unwrap_err();
        assert!(matches!(err, AppError::Database(sqlx::Error::PoolClosed)));

        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, sqlx::Error::PoolClosed.to_string().as_bytes());
    }

    #[tokio::test]
    async fn update_distinguishes_not_found_from_other_failures() {
        let mut mock = MockBooksRepository::new();
        mock.expect_update()
            .withf(|id, _| id == "missing")
            .returning(|id, _| Err(AppError::NotFound(format!("Book {} not found", id))));
        mock.expect_update()
            .withf(|id, _| id == "b1")
            .returning(|_, _| Err(AppError::Database(sqlx::Error::PoolClosed)));
        let svc = service(mock);

        match svc.update("missing", &pages_patch(688)).await.unwrap_err() {
            AppError::NotFound(msg) => assert_eq!(msg, "Book not found"),
            other => panic!("expected not found, got {:?}", other),
        }
        match svc.update("b1", &pages_patch(688)).await.unwrap_err() {
            AppError::Internal(msg) => assert_eq!(msg, "failed to update book"),
            other => panic!("expected internal error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_patch_is_rejected_for_existing_books() {
        let mut mock = MockBooksRepository::new();
        mock.expect_find_by_id().returning(|_| Ok(dune()));
        mock.expect_update().never();

        match service(mock).update("b1", &BookPatch::default()).await.unwrap_err() {
            AppError::BadRequest(msg) => assert_eq!(msg, "no valid fields provided"),
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_patch_on_unknown_book_is_not_found() {
        let mut mock = MockBooksRepository::new();
        mock.expect_find_by_id()
            .returning(|id| Err(AppError::NotFound(format!("Book {} not found", id))));

        let err = service(mock)
            .update("missing", &BookPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_returns_the_stored_record() {
        let mut mock = MockBooksRepository::new();
        mock.expect_update()
            .withf(|id, patch| id == "b1" && patch.pages == Some(688))
            .returning(|_, patch| {
                let mut book = dune();
                book.apply(patch);
                Ok(book)
            });

        let book = service(mock).update("b1", &pages_patch(688)).await.unwrap();
        assert_eq!(book.pages, 688);
        assert_eq!(book.title, "Dune");
    }

    #[tokio::test]
    async fn delete_collapses_failures_into_not_found() {
        let mut mock = MockBooksRepository::new();
        mock.expect_delete()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolClosed)));

        assert!(service(mock).delete("b1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn ping_failure_is_unavailable() {
        let mut mock = MockBooksRepository::new();
        mock.expect_ping()
            .returning(|| Err(AppError::Database(sqlx::Error::PoolClosed)));

        let err = service(mock).ping().await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));
    }
}
