//! Book Shelf - A filterable book listing service
//!
//! Lists books through a process-local read-through cache with TTL expiry.
//! Filters are compiled into parameterized queries; filter values never reach
//! query text. Single-book reads and writes go straight to storage and reach
//! listings once their cache entries expire.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod service;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use service::ListService;
pub use tasks::spawn_sweep_task;
