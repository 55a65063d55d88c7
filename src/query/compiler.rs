//! Filter compiler
//!
//! Turns an untrusted [`FilterSpec`] into a [`CompiledQuery`]: a list of
//! predicates with bound parameters, a whitelisted order clause, and the page
//! window. Clause text is only ever assembled from [`Column`] and
//! [`MatchKind`] values; filter values travel exclusively as parameters.

use crate::models::{FilterSpec, ListOptions};
use crate::query::{Column, OrderClause};

const SELECT_BOOKS: &str = "SELECT b.id AS id, b.title AS title, b.description AS description, \
b.image AS image, b.date AS date, a.name AS author \
FROM `books` b INNER JOIN `authors` a ON a.id = b.author_id";

// == Predicate ==
/// How a predicate compares its column with the bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Full-text relevance match
    FullText,
    /// Exact equality
    Equals,
}

/// One filter condition and its bound value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub kind: MatchKind,
    pub column: Column,
    pub param: String,
}

impl Predicate {
    /// Clause text with a single `?` placeholder for [`Predicate::param`].
    pub fn clause(&self) -> String {
        match self.kind {
            MatchKind::FullText => format!("MATCH({}) AGAINST (?)", self.column.sql()),
            MatchKind::Equals => format!("{} = ?", self.column.sql()),
        }
    }
}

// Filter names in the order their predicates are emitted.
const FILTERS: [(&str, MatchKind, Column); 5] = [
    ("author", MatchKind::FullText, Column::AuthorName),
    ("date", MatchKind::Equals, Column::Date),
    ("image", MatchKind::Equals, Column::Image),
    ("title", MatchKind::FullText, Column::Title),
    ("description", MatchKind::FullText, Column::Description),
];

// == Compiled Query ==
/// A parameterized list query, built per request and consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    /// AND-combined conditions; empty means match everything
    pub predicates: Vec<Predicate>,
    pub order: OrderClause,
    pub limit: u32,
    pub offset: u64,
}

impl CompiledQuery {
    /// `WHERE ...` text, or `None` when there are no predicates.
    pub fn where_clause(&self) -> Option<String> {
        if self.predicates.is_empty() {
            return None;
        }

        let clauses: Vec<String> = self.predicates.iter().map(Predicate::clause).collect();
        Some(format!("WHERE {}", clauses.join(" AND ")))
    }

    /// Full query text with `?` placeholders.
    ///
    /// `limit` and `offset` are integers and are rendered inline.
    pub fn to_sql(&self) -> String {
        let mut sql = String::from(SELECT_BOOKS);

        if let Some(where_clause) = self.where_clause() {
            sql.push(' ');
            sql.push_str(&where_clause);
        }

        sql.push_str(&format!(
            " ORDER BY {} LIMIT {} OFFSET {}",
            self.order, self.limit, self.offset
        ));
        sql
    }

    /// Bound values in placeholder order.
    pub fn params(&self) -> Vec<&str> {
        self.predicates.iter().map(|p| p.param.as_str()).collect()
    }
}

// == Compile ==
/// Compiles `filter` plus a validated page window.
///
/// Never fails: unknown names are ignored, list-valued or empty conditions
/// are skipped, and an unusable `order` falls back to identity ascending.
pub fn compile(filter: &FilterSpec, limit: u32, offset: u64) -> CompiledQuery {
    let predicates = FILTERS
        .iter()
        .filter_map(|(name, kind, column)| {
            filter
                .text(name)
                .filter(|value| !value.is_empty())
                .map(|value| Predicate {
                    kind: *kind,
                    column: *column,
                    param: value.to_string(),
                })
        })
        .collect();

    CompiledQuery {
        predicates,
        order: OrderClause::resolve(filter.text("order")),
        limit,
        offset,
    }
}

impl From<&ListOptions> for CompiledQuery {
    fn from(options: &ListOptions) -> Self {
        compile(&options.filter, options.limit, options.offset)
    }
}
