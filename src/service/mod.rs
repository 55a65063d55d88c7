//! Service Module
//!
//! Read-through orchestration of the cache, the query compiler and storage.

mod list;

pub use list::{BookList, ListService};
