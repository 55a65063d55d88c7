//! Columns the compiler is allowed to reference.

/// A column of the `books b INNER JOIN authors a` row source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Title,
    Description,
    Image,
    Date,
    AuthorName,
}

impl Column {
    /// Qualified column reference as it appears in query text.
    pub fn sql(self) -> &'static str {
        match self {
            Column::Id => "b.id",
            Column::Title => "b.title",
            Column::Description => "b.description",
            Column::Image => "b.image",
            Column::Date => "b.date",
            Column::AuthorName => "a.name",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_references() {
        assert_eq!(Column::Id.sql(), "b.id");
        assert_eq!(Column::AuthorName.sql(), "a.name");
    }
}
