//! Data model and DTOs for the listing service
//!
//! Domain records, normalized list options, and the request/response shapes
//! used by the HTTP layer.

pub mod book;
pub mod options;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use book::{AuthorRecord, AuthorRef, BookRecord, NewBook};
pub use options::{FilterSpec, FilterValue, ListOptions};
pub use requests::{BookPayload, ListParams};
pub use responses::{HealthResponse, StatsResponse};
