//! List options and filter conditions.
//!
//! `ListOptions` is the normalized form of a list request: it is what the cache
//! key is derived from and what the query compiler consumes.

use std::collections::BTreeMap;

use serde::Serialize;

// == Filter Value ==
/// A raw filter value. Repeated query parameters arrive as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    List(Vec<String>),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        FilterValue::List(values)
    }
}

// == Filter Spec ==
/// Named filter conditions plus the optional `order` selector.
///
/// Backed by a `BTreeMap`, so iteration and serialization order never depend
/// on the order conditions were inserted in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSpec(BTreeMap<String, FilterValue>);

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a condition. A name seen twice becomes a list value.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.0.remove(&name) {
            None => {
                self.0.insert(name, FilterValue::Text(value));
            }
            Some(FilterValue::Text(first)) => {
                self.0.insert(name, FilterValue::List(vec![first, value]));
            }
            Some(FilterValue::List(mut values)) => {
                values.push(value);
                self.0.insert(name, FilterValue::List(values));
            }
        }
    }

    /// Inserts or replaces a condition.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FilterValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.0.get(name)
    }

    /// Returns the value for `name` only when it is a single string.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(FilterValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// == List Options ==
/// Normalized options of one list request.
///
/// `limit` and `offset` are expected to be validated already (see
/// [`crate::models::ListParams`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListOptions {
    /// Filter conditions, omitted from the serialized form when empty
    #[serde(skip_serializing_if = "FilterSpec::is_empty")]
    pub filter: FilterSpec,
    pub limit: u32,
    pub offset: u64,
}

impl ListOptions {
    pub fn new(limit: u32, offset: u64, filter: FilterSpec) -> Self {
        Self {
            filter,
            limit,
            offset,
        }
    }
}
