//! Query Module
//!
//! Compiles list filters into parameterized queries over the book catalogue.

mod column;
mod compiler;
mod order;

pub use column::Column;
pub use compiler::{compile, CompiledQuery, MatchKind, Predicate};
pub use order::{Direction, OrderClause};
