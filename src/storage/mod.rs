//! Storage Module
//!
//! The listing service reaches storage only through [`BookStorage`]. Single
//! book reads and writes go through [`BookRepository`] and bypass the list
//! cache.

mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{BookRecord, NewBook};
use crate::query::CompiledQuery;

pub use memory::MemoryStorage;

/// Executes compiled list queries.
///
/// Implementations bind [`CompiledQuery::params`] to the placeholders of
/// [`CompiledQuery::to_sql`] (or evaluate the query natively) and return rows
/// in the query's order.
#[async_trait]
pub trait BookStorage: Send + Sync {
    async fn execute(&self, query: &CompiledQuery) -> Result<Vec<BookRecord>>;
}

/// Reads and writes single books by id.
///
/// Writes resolve the author of a [`NewBook`] and reject an unknown author or
/// a second book with the same author and title as
/// [`crate::error::ServiceError::Validation`].
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn find_by_id(&self, id: u64) -> Result<Option<BookRecord>>;

    /// Stores a new book under a fresh id.
    async fn create(&self, book: NewBook) -> Result<BookRecord>;

    /// Replaces a book. `None` when no book has this id.
    async fn update_by_id(&self, id: u64, book: NewBook) -> Result<Option<BookRecord>>;

    /// Deletes a book, returning whether it existed.
    async fn remove_by_id(&self, id: u64) -> Result<bool>;
}
