//! API Handlers
//!
//! HTTP request handlers for each endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::cache::ExpiringStore;
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::models::{BookPayload, BookRecord, HealthResponse, ListParams, StatsResponse};
use crate::service::{BookList, ListService};
use crate::storage::{BookRepository, BookStorage};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cached book listing
    pub service: ListService,
    /// Single-book reads and writes, not cached
    pub books: Arc<dyn BookRepository>,
    /// Page size used when a request has no usable `limit`
    pub default_limit: u32,
    /// Upper clamp for `limit`
    pub max_limit: u32,
}

impl AppState {
    /// Creates a new AppState around an existing service and repository.
    pub fn new(service: ListService, books: Arc<dyn BookRepository>) -> Self {
        let defaults = Config::default();
        Self {
            service,
            books,
            default_limit: defaults.default_limit,
            max_limit: defaults.max_limit,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds a fresh cache with the configured TTL in front of `storage`,
    /// which also serves single-book reads and writes.
    pub fn from_config<S>(config: &Config, storage: Arc<S>) -> Self
    where
        S: BookStorage + BookRepository + 'static,
    {
        let cache = ExpiringStore::new(config.cache_ttl).into_shared();
        Self {
            service: ListService::new(cache, storage.clone()),
            books: storage,
            default_limit: config.default_limit,
            max_limit: config.max_limit,
        }
    }
}

/// Handler for GET /books
///
/// `limit` and `offset` are validated here; all other parameters form the
/// filter and are handed to the service as-is.
pub async fn list_books_handler(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<BookList>> {
    let options =
        ListParams::from_pairs(pairs).into_options(state.default_limit, state.max_limit);
    let books = state.service.list(&options).await?;

    Ok(Json(books))
}

/// Parses the `:id` path segment.
///
/// A segment that is not an integer names no book (404); zero or a negative
/// integer is a bad request.
fn parse_id(raw: &str) -> Result<u64> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, raw),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ServiceError::NotFound("Not found".to_string()));
    }

    match digits.parse::<u64>() {
        Ok(id) if id >= 1 && !negative => Ok(id),
        // Larger than any stored id
        Err(_) if !negative => Err(ServiceError::NotFound("Not found".to_string())),
        _ => Err(ServiceError::Validation("id should be positive".to_string())),
    }
}

/// Handler for GET /books/:id
pub async fn get_book_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookRecord>> {
    let id = parse_id(&id)?;

    match state.books.find_by_id(id).await? {
        Some(book) => Ok(Json(book)),
        None => Err(ServiceError::NotFound("Not found".to_string())),
    }
}

/// Handler for POST /books
///
/// Stores a new book and returns it with its id. Cached listings pick it up
/// once their entries expire.
pub async fn create_book_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<BookRecord>> {
    let book = BookPayload::from_slice(&body)?.validate()?;
    let created = state.books.create(book).await?;

    info!(id = created.id, "Book created");
    Ok(Json(created))
}

/// Handler for PUT /books/:id
pub async fn update_book_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<BookRecord>> {
    let id = parse_id(&id)?;
    let book = BookPayload::from_slice(&body)?.validate()?;

    match state.books.update_by_id(id, book).await? {
        Some(updated) => {
            info!(id, "Book updated");
            Ok(Json(updated))
        }
        None => Err(ServiceError::NotFound("Not found".to_string())),
    }
}

/// Handler for DELETE /books/:id
pub async fn delete_book_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id)?;

    if state.books.remove_by_id(id).await? {
        info!(id, "Book removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServiceError::NotFound("Not found".to_string()))
    }
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.service.cache().read().await.stats();
    Json(StatsResponse::from(stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Fallback for unknown routes.
pub async fn not_found_handler() -> ServiceError {
    ServiceError::NotFound("Not found".to_string())
}
