//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Book Catalog API",
        version = "1.0.0",
        description = "Library catalog book management REST API"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
    ),
    components(
        schemas(
            crate::models::book::Book,
            crate::models::book::BookStatus,
            crate::models::book::CreateBook,
            crate::models::book::BookPatch,
            health::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
