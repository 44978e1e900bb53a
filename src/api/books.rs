//! Book endpoints

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{rejection::PathRejection, FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    Json,
};
use serde_json::{Map, Value};

use crate::{
    error::AppResult,
    models::book::{Book, BookPatch, CreateBook},
};

use super::JsonPayload;

/// Book ID taken from the path, empty when the route carries none.
///
/// A segment that does not percent-decode is kept raw, so it is looked up
/// and reported as not found instead of missing.
pub struct BookId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BookId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let id = match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(id)) => id,
            Err(PathRejection::MissingPathParams(_)) => String::new(),
            Err(e) => {
                tracing::debug!("Undecodable book ID in {}: {}", parts.uri.path(), e);
                parts
                    .uri
                    .path()
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            }
        };
        Ok(BookId(id))
    }
}

/// List all books
#[utoipa::path(
    get,
    path = "/api/books",
    tag = "books",
    responses(
        (status = 200, description = "All books in insertion order", body = Vec<Book>),
        (status = 500, description = "Storage failure", body = String)
    )
)]
pub async fn list_books(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list().await?;
    Ok(Json(books))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Missing book ID", body = String),
        (status = 404, description = "Book not found", body = String)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    BookId(id): BookId,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get_by_id(&id).await?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/api/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Malformed JSON or missing fields", body = String),
        (status = 500, description = "Storage failure", body = String)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    JsonPayload(data): JsonPayload<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.books.create(&data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update some fields of a book.
///
/// Any JSON object is accepted; unknown keys and invalid values are ignored.
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = BookPatch,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Missing ID, malformed JSON or no valid fields", body = String),
        (status = 404, description = "Book not found", body = String),
        (status = 500, description = "Storage failure", body = String)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    BookId(id): BookId,
    JsonPayload(fields): JsonPayload<Map<String, Value>>,
) -> AppResult<Json<Book>> {
    let patch = BookPatch::from(fields);
    let book = state.services.books.update(&id, &patch).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 400, description = "Missing book ID", body = String),
        (status = 404, description = "Book not found", body = String)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    BookId(id): BookId,
) -> AppResult<StatusCode> {
    state.services.books.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
