//! API Module
//!
//! HTTP handlers and routing for the book listing API.
//!
//! # Endpoints
//! - `GET /books` - List books (`limit`, `offset`, `order`, filters)
//! - `POST /books`, `GET|PUT|DELETE /books/:id` - Single-book reads and writes
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
