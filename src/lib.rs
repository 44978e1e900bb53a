//! Book Catalog Server
//!
//! A small REST JSON API exposing create/read/update/delete operations over
//! the books of a library catalog.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, services: services::Services) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
