//! API handlers for the book catalog REST endpoints

pub mod books;
pub mod health;
pub mod openapi;

use std::time::Duration;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use serde::{de::DeserializeOwned, Deserialize};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::CorsConfig, error::AppError, AppState};

/// Lifetime of a cached preflight response
const CORS_MAX_AGE_SECS: u64 = 300;

/// JSON body extractor answering malformed payloads with a 400 and the
/// decoder's message. Only the first JSON value of the body is read; the
/// content type is not checked.
pub struct JsonPayload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let mut deserializer = serde_json::Deserializer::from_slice(&bytes);
        T::deserialize(&mut deserializer)
            .map(JsonPayload)
            .map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // No id segment at all
        .route(
            "/books/",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// CORS for the catalog front-end. Preflight `OPTIONS` requests on any path
/// are answered here with an empty 200.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .origins()
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .allow_credentials(false)
        .max_age(Duration::from_secs(CORS_MAX_AGE_SECS))
}
