//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache sweep: removes expired list results, period equal to the cache TTL

mod sweep;

pub use sweep::spawn_sweep_task;
