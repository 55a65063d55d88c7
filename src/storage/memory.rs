//! In-memory book storage
//!
//! Evaluates compiled queries directly against a vector of records, and
//! serves single-book reads and writes. Full-text
//! predicates approximate a natural-language match: a row matches when any
//! term of the parameter appears as a word of the column, ignoring case.

use std::cmp::Ordering;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Result, ServiceError};
use crate::models::{AuthorRecord, AuthorRef, BookRecord, NewBook};
use crate::query::{Column, CompiledQuery, Direction, MatchKind, Predicate};
use crate::storage::{BookRepository, BookStorage};

/// Book storage held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    catalogue: RwLock<Catalogue>,
}

/// Books plus the authors they reference.
///
/// Authors are registered from the books they appear on, numbered in
/// first-seen order. Ids are never reused after a delete.
#[derive(Debug, Default)]
struct Catalogue {
    books: Vec<BookRecord>,
    authors: Vec<AuthorRecord>,
    last_id: u64,
}

impl Catalogue {
    fn push(&mut self, book: BookRecord) {
        self.register_author(&book.author);
        self.last_id = self.last_id.max(book.id);
        self.books.push(book);
    }

    fn register_author(&mut self, name: &str) -> AuthorRecord {
        if let Some(author) = self.authors.iter().find(|a| a.name == name) {
            return author.clone();
        }

        let author = AuthorRecord::new(self.authors.len() as u64 + 1, name);
        self.authors.push(author.clone());
        author
    }

    fn resolve_author(&self, author: &AuthorRef) -> Result<String> {
        let found = match author {
            AuthorRef::Id(id) => self.authors.iter().find(|a| a.id == *id),
            AuthorRef::Name(name) => self.authors.iter().find(|a| &a.name == name),
        };

        found
            .map(|a| a.name.clone())
            .ok_or_else(|| ServiceError::Validation("Incorrect book author".to_string()))
    }

    /// (author, title) is unique, `except` being the book under update.
    fn ensure_unique(&self, except: Option<u64>, author: &str, title: &str) -> Result<()> {
        let taken = self
            .books
            .iter()
            .any(|b| Some(b.id) != except && b.author == author && b.title == title);

        if taken {
            Err(ServiceError::Validation("Duplicate entry".to_string()))
        } else {
            Ok(())
        }
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.books.iter().position(|b| b.id == id)
    }
}

impl MemoryStorage {
    pub fn new(books: Vec<BookRecord>) -> Self {
        let mut catalogue = Catalogue::default();
        for book in books {
            catalogue.push(book);
        }

        Self {
            catalogue: RwLock::new(catalogue),
        }
    }

    /// Loads a JSON array of books.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await.map_err(|e| {
            ServiceError::Storage(format!("failed to read {}: {}", path.display(), e))
        })?;
        let books: Vec<BookRecord> = serde_json::from_slice(&raw).map_err(|e| {
            ServiceError::Storage(format!("failed to parse {}: {}", path.display(), e))
        })?;

        debug!(count = books.len(), path = %path.display(), "loaded books");
        Ok(Self::new(books))
    }

    /// Adds a book as is, registering its author. Cached listings do not see
    /// it until their entry expires.
    pub async fn insert(&self, book: BookRecord) {
        self.catalogue.write().await.push(book);
    }

    /// Registers an author with no books yet, or returns the existing one.
    pub async fn add_author(&self, name: &str) -> AuthorRecord {
        self.catalogue.write().await.register_author(name)
    }

    pub async fn len(&self) -> usize {
        self.catalogue.read().await.books.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.catalogue.read().await.books.is_empty()
    }
}

#[async_trait]
impl BookStorage for MemoryStorage {
    async fn execute(&self, query: &CompiledQuery) -> Result<Vec<BookRecord>> {
        let catalogue = self.catalogue.read().await;

        let mut rows: Vec<&BookRecord> = catalogue
            .books
            .iter()
            .filter(|book| query.predicates.iter().all(|p| matches(book, p)))
            .collect();

        rows.sort_by(|a, b| {
            let ordering = compare(a, b, query.order.column).then_with(|| a.id.cmp(&b.id));
            match query.order.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        });

        Ok(rows
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BookRepository for MemoryStorage {
    async fn find_by_id(&self, id: u64) -> Result<Option<BookRecord>> {
        let catalogue = self.catalogue.read().await;
        Ok(catalogue.position(id).map(|index| catalogue.books[index].clone()))
    }

    async fn create(&self, book: NewBook) -> Result<BookRecord> {
        let mut catalogue = self.catalogue.write().await;

        let author = catalogue.resolve_author(&book.author)?;
        catalogue.ensure_unique(None, &author, &book.title)?;

        catalogue.last_id += 1;
        let record = book.into_record(catalogue.last_id, author);
        catalogue.books.push(record.clone());

        debug!(id = record.id, "book created");
        Ok(record)
    }

    async fn update_by_id(&self, id: u64, book: NewBook) -> Result<Option<BookRecord>> {
        let mut catalogue = self.catalogue.write().await;

        let author = catalogue.resolve_author(&book.author)?;
        let Some(index) = catalogue.position(id) else {
            return Ok(None);
        };
        catalogue.ensure_unique(Some(id), &author, &book.title)?;

        let record = book.into_record(id, author);
        catalogue.books[index] = record.clone();

        debug!(id, "book updated");
        Ok(Some(record))
    }

    async fn remove_by_id(&self, id: u64) -> Result<bool> {
        let mut catalogue = self.catalogue.write().await;

        match catalogue.position(id) {
            Some(index) => {
                catalogue.books.remove(index);
                debug!(id, "book removed");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn text(book: &BookRecord, column: Column) -> &str {
    match column {
        Column::Title => &book.title,
        Column::Description => &book.description,
        Column::Image => &book.image,
        Column::Date => &book.date,
        Column::AuthorName => &book.author,
        // Identity is numeric and is never the target of a text predicate
        Column::Id => "",
    }
}

fn compare(a: &BookRecord, b: &BookRecord, column: Column) -> Ordering {
    match column {
        Column::Id => a.id.cmp(&b.id),
        other => text(a, other).cmp(text(b, other)),
    }
}

fn matches(book: &BookRecord, predicate: &Predicate) -> bool {
    let value = text(book, predicate.column);

    match predicate.kind {
        MatchKind::Equals => value == predicate.param,
        MatchKind::FullText => {
            let column_words: Vec<String> = words(value).collect();
            words(&predicate.param).any(|term| column_words.contains(&term))
        }
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterSpec;
    use crate::query::compile;

    fn catalogue() -> MemoryStorage {
        MemoryStorage::new(vec![
            BookRecord::new(
                1,
                "Moby Dick",
                "The whale hunt.",
                "moby.png",
                "1851-10-18",
                "Herman Melville",
            ),
            BookRecord::new(
                2,
                "Billy Budd",
                "A sailor's story.",
                "budd.jpg",
                "1924-01-01",
                "Herman Melville",
            ),
            BookRecord::new(
                3,
                "Anna Karenina",
                "A story of love.",
                "anna.gif",
                "1878-01-01",
                "Leo Tolstoy",
            ),
        ])
    }

    async fn run(storage: &MemoryStorage, filter: FilterSpec) -> Vec<u64> {
        let query = compile(&filter, 20, 0);
        storage
            .execute(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|book| book.id)
            .collect()
    }

    #[tokio::test]
    async fn test_match_all_in_identity_order() {
        let storage = catalogue();
        assert_eq!(run(&storage, FilterSpec::new()).await, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_full_text_matches_words_case_insensitively() {
        let storage = catalogue();

        assert_eq!(run(&storage, FilterSpec::new().with("title", "moby")).await, vec![1]);
        assert_eq!(
            run(&storage, FilterSpec::new().with("author", "melville")).await,
            vec![1, 2]
        );
        assert_eq!(
            run(&storage, FilterSpec::new().with("description", "story")).await,
            vec![2, 3]
        );
    }

    #[tokio::test]
    async fn test_equality_is_exact() {
        let storage = catalogue();

        assert_eq!(
            run(&storage, FilterSpec::new().with("date", "1878-01-01")).await,
            vec![3]
        );
        assert!(run(&storage, FilterSpec::new().with("date", "1878")).await.is_empty());
        assert!(run(&storage, FilterSpec::new().with("image", "MOBY.PNG")).await.is_empty());
    }

    #[tokio::test]
    async fn test_predicates_are_combined_with_and() {
        let storage = catalogue();
        let filter = FilterSpec::new()
            .with("author", "Melville")
            .with("description", "story");

        assert_eq!(run(&storage, filter).await, vec![2]);
    }

    #[tokio::test]
    async fn test_ordering_and_window() {
        let storage = catalogue();

        assert_eq!(
            run(&storage, FilterSpec::new().with("order", "title desc")).await,
            vec![1, 2, 3]
        );
        assert_eq!(
            run(&storage, FilterSpec::new().with("order", "date")).await,
            vec![1, 3, 2]
        );

        let query = compile(&FilterSpec::new().with("order", "title"), 1, 1);
        let page = storage.execute(&query).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 2);
    }

    #[tokio::test]
    async fn test_hostile_values_match_nothing() {
        let storage = catalogue();
        let filter = FilterSpec::new().with("image", "a'; DROP TABLE x; --");

        assert!(run(&storage, filter).await.is_empty());
        assert_eq!(storage.len().await, 3);
    }

    #[tokio::test]
    async fn test_insert() {
        let storage = MemoryStorage::default();
        assert!(storage.is_empty().await);

        storage
            .insert(BookRecord::new(9, "Dune", "Sand.", "dune.png", "1965-08-01", "Frank Herbert"))
            .await;
        assert_eq!(run(&storage, FilterSpec::new().with("title", "dune")).await, vec![9]);
    }

    fn new_book(title: &str, author: AuthorRef) -> NewBook {
        NewBook {
            title: title.to_string(),
            description: "Added later.".to_string(),
            image: "new.png".to_string(),
            date: "2001-02-03".to_string(),
            author,
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let storage = catalogue();

        let book = storage.find_by_id(3).await.unwrap().unwrap();
        assert_eq!(book.title, "Anna Karenina");
        assert!(storage.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_resolves_author_by_id_or_name() {
        let storage = catalogue();

        // Authors are numbered in first-seen order: Melville 1, Tolstoy 2
        let by_id = storage
            .create(new_book("War and Peace", AuthorRef::Id(2)))
            .await
            .unwrap();
        assert_eq!(by_id.id, 4);
        assert_eq!(by_id.author, "Leo Tolstoy");

        let by_name = storage
            .create(new_book("Typee", AuthorRef::Name("Herman Melville".to_string())))
            .await
            .unwrap();
        assert_eq!(by_name.id, 5);
        assert_eq!(storage.find_by_id(5).await.unwrap(), Some(by_name));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_author() {
        let storage = catalogue();

        for author in [AuthorRef::Id(42), AuthorRef::Name("herman melville".to_string())] {
            let result = storage.create(new_book("Typee", author)).await;
            assert!(
                matches!(result, Err(ServiceError::Validation(ref m)) if m == "Incorrect book author")
            );
        }

        let author = storage.add_author("Frank Herbert").await;
        assert_eq!(author.id, 3);
        let created = storage
            .create(new_book("Dune", AuthorRef::Name("Frank Herbert".to_string())))
            .await
            .unwrap();
        assert_eq!(created.author, "Frank Herbert");
    }

    #[tokio::test]
    async fn test_duplicate_author_and_title_is_rejected() {
        let storage = catalogue();

        let result = storage
            .create(new_book("Moby Dick", AuthorRef::Id(1)))
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(ref m)) if m == "Duplicate entry"));

        // Same title under another author is fine
        assert!(storage.create(new_book("Moby Dick", AuthorRef::Id(2))).await.is_ok());

        let result = storage
            .update_by_id(2, new_book("Moby Dick", AuthorRef::Id(1)))
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(ref m)) if m == "Duplicate entry"));

        // A book may keep its own title
        assert!(storage
            .update_by_id(1, new_book("Moby Dick", AuthorRef::Id(1)))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_update_by_id() {
        let storage = catalogue();

        let updated = storage
            .update_by_id(2, new_book("Typee", AuthorRef::Id(1)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, 2);
        assert_eq!(updated.title, "Typee");
        assert_eq!(storage.find_by_id(2).await.unwrap(), Some(updated));

        assert!(storage
            .update_by_id(99, new_book("Typee", AuthorRef::Id(1)))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_remove_by_id_does_not_reuse_ids() {
        let storage = catalogue();

        assert!(storage.remove_by_id(3).await.unwrap());
        assert!(!storage.remove_by_id(3).await.unwrap());
        assert_eq!(storage.len().await, 2);

        let created = storage
            .create(new_book("Typee", AuthorRef::Id(1)))
            .await
            .unwrap();
        assert_eq!(created.id, 4);
    }
}
