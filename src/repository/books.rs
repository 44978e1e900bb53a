//! PostgreSQL book repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::BooksRepository;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookPatch, CreateBook},
};

const BOOK_COLUMNS: &str =
    "id, title, author, description, published_date, genre, pages, language, status";

#[derive(Clone)]
pub struct PgBooksRepository {
    pool: Pool<Postgres>,
}

impl PgBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BooksRepository for PgBooksRepository {
    async fn find_all(&self) -> AppResult<Vec<Book>> {
        let query = format!("SELECT {} FROM books ORDER BY seq", BOOK_COLUMNS);
        let rows = sqlx::query_as::<_, Book>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Book> {
        let query = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn insert(&self, data: &CreateBook) -> AppResult<Book> {
        let id = Uuid::new_v4().to_string();
        let query = format!(
            r#"
            INSERT INTO books (id, title, author, description, published_date, genre, pages, language, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        let row = sqlx::query_as::<_, Book>(&query)
            .bind(&id)
            .bind(&data.title)
            .bind(&data.author)
            .bind(&data.description)
            .bind(&data.published_date)
            .bind(&data.genre)
            .bind(data.pages)
            .bind(&data.language)
            .bind(&data.status)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: &str, patch: &BookPatch) -> AppResult<Book> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(patch.title, "title");
        add_field!(patch.author, "author");
        add_field!(patch.description, "description");
        add_field!(patch.published_date, "published_date");
        add_field!(patch.genre, "genre");
        add_field!(patch.pages, "pages");
        add_field!(patch.language, "language");
        add_field!(patch.status, "status");

        let query = format!(
            "UPDATE books SET {} WHERE id = ${} RETURNING {}",
            sets.join(", "),
            idx,
            BOOK_COLUMNS
        );

        let mut builder = sqlx::query_as::<_, Book>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(patch.title);
        bind_field!(patch.author);
        bind_field!(patch.description);
        bind_field!(patch.published_date);
        bind_field!(patch.genre);
        bind_field!(patch.pages);
        bind_field!(patch.language);
        if let Some(status) = patch.status {
            builder = builder.bind(status.as_str());
        }

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
