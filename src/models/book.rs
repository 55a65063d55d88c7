//! Book and author records, and the validated input of a book write.

use serde::{Deserialize, Serialize};

/// A single book row joined with its author's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub image: String,
    /// Publication date as stored, `YYYY-MM-DD`
    pub date: String,
    /// Author name
    pub author: String,
}

impl BookRecord {
    /// Creates a new BookRecord
    pub fn new(
        id: u64,
        title: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
        date: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            image: image.into(),
            date: date.into(),
            author: author.into(),
        }
    }
}

/// An author row. Books reference authors by id or by exact name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRecord {
    pub id: u64,
    pub name: String,
}

impl AuthorRecord {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// How a write names the book's author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorRef {
    Id(u64),
    Name(String),
}

/// A validated book to create or to replace an existing one with.
///
/// Built by [`crate::models::BookPayload::validate`]; the author is resolved
/// by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub description: String,
    pub image: String,
    pub date: String,
    pub author: AuthorRef,
}

impl NewBook {
    /// Builds the stored record once the author name is known.
    pub fn into_record(self, id: u64, author: impl Into<String>) -> BookRecord {
        BookRecord::new(id, self.title, self.description, self.image, self.date, author)
    }
}
