//! Book model

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

/// Message returned when a create request misses any field
pub const REQUIRED_FIELDS_MESSAGE: &str =
    "all fields are required: title, author, description, publishedDate, genre, pages (>0), language, status";

/// Book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-generated identifier
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub published_date: String,
    pub genre: String,
    /// Number of pages, always positive
    pub pages: i32,
    pub language: String,
    /// Circulation status (available, borrowed or reserved when set by an update)
    pub status: String,
}

impl Book {
    /// Apply the qualifying fields of a patch in place
    pub fn apply(&mut self, patch: &BookPatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref author) = patch.author {
            self.author = author.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        if let Some(ref published_date) = patch.published_date {
            self.published_date = published_date.clone();
        }
        if let Some(ref genre) = patch.genre {
            self.genre = genre.clone();
        }
        if let Some(pages) = patch.pages {
            self.pages = pages;
        }
        if let Some(ref language) = patch.language {
            self.language = language.clone();
        }
        if let Some(status) = patch.status {
            self.status = status.as_str().to_string();
        }
    }
}

/// Circulation status accepted by updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Available,
    Borrowed,
    Reserved,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
            BookStatus::Reserved => "reserved",
        }
    }
}

impl FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(BookStatus::Available),
            "borrowed" => Ok(BookStatus::Borrowed),
            "reserved" => Ok(BookStatus::Reserved),
            other => Err(format!("unknown book status '{}'", other)),
        }
    }
}

/// Create book request.
///
/// Missing or `null` fields decode to their zero value and are then rejected
/// as a whole by validation. Status is stored as given.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBook {
    #[serde(deserialize_with = "null_as_default")]
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(length(min = 1))]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(length(min = 1))]
    pub published_date: String,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(length(min = 1))]
    pub genre: String,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(range(min = 1))]
    pub pages: i32,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(length(min = 1))]
    pub language: String,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(length(min = 1))]
    pub status: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Partial update of a book.
///
/// Built from an arbitrary JSON object: only recognized keys holding a valid
/// value survive, everything else is dropped silently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookStatus>,
}

impl BookPatch {
    /// True when no field qualified for the update
    pub fn is_empty(&self) -> bool {
        self == &BookPatch::default()
    }

    /// Names of the fields this patch changes, as they appear in JSON
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.title.is_some() {
            names.push("title");
        }
        if self.author.is_some() {
            names.push("author");
        }
        if self.description.is_some() {
            names.push("description");
        }
        if self.published_date.is_some() {
            names.push("publishedDate");
        }
        if self.genre.is_some() {
            names.push("genre");
        }
        if self.pages.is_some() {
            names.push("pages");
        }
        if self.language.is_some() {
            names.push("language");
        }
        if self.status.is_some() {
            names.push("status");
        }
        names
    }
}

impl From<Map<String, Value>> for BookPatch {
    fn from(fields: Map<String, Value>) -> Self {
        let mut patch = BookPatch::default();
        for (key, value) in fields {
            match key.as_str() {
                "title" => patch.title = non_empty_string(value),
                "author" => patch.author = non_empty_string(value),
                "description" => patch.description = non_empty_string(value),
                "publishedDate" => patch.published_date = non_empty_string(value),
                "genre" => patch.genre = non_empty_string(value),
                "pages" => patch.pages = positive_pages(&value),
                "language" => patch.language = non_empty_string(value),
                "status" => {
                    patch.status = non_empty_string(value).and_then(|s| s.parse().ok());
                }
                _ => {}
            }
        }
        patch
    }
}

fn non_empty_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// Any positive JSON number, truncated toward zero. Values that would not
/// yield a positive 32-bit page count are dropped.
fn positive_pages(value: &Value) -> Option<i32> {
    let n = value.as_f64()?;
    if n <= 0.0 {
        return None;
    }
    let pages = n.trunc();
    if pages < 1.0 || pages > f64::from(i32::MAX) {
        return None;
    }
    Some(pages as i32)
}
