//! Sort order resolution.
//!
//! The user-supplied `order` string only ever selects one of a fixed set of
//! columns and one of two directions; none of its text reaches the query.

use std::fmt;

use crate::query::Column;

// == Direction ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Only the literal token `desc` (any case) selects descending order.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(token) if token.eq_ignore_ascii_case("desc") => Direction::Desc,
            _ => Direction::Asc,
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

// == Order Clause ==
/// Resolved `ORDER BY` target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderClause {
    pub column: Column,
    pub direction: Direction,
}

impl Default for OrderClause {
    /// Primary identity, ascending.
    fn default() -> Self {
        Self {
            column: Column::Id,
            direction: Direction::Asc,
        }
    }
}

impl OrderClause {
    /// Resolves an `"<field> [asc|desc]"` selector.
    ///
    /// Unknown or missing fields fall back to the identity column; the
    /// direction is resolved independently of the field.
    pub fn resolve(order: Option<&str>) -> Self {
        let mut tokens = match order {
            Some(order) => order.split_whitespace(),
            None => return Self::default(),
        };

        let column = match tokens.next().map(str::to_ascii_lowercase).as_deref() {
            Some("title") => Column::Title,
            Some("image") => Column::Image,
            Some("date") => Column::Date,
            Some("author") => Column::AuthorName,
            Some(_) => Column::Id,
            None => return Self::default(),
        };

        Self {
            column,
            direction: Direction::from_token(tokens.next()),
        }
    }
}

impl fmt::Display for OrderClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column.sql(), self.direction.sql())
    }
}
