//! Request DTOs for the book API
//!
//! Turns raw query parameters into validated `ListOptions`, and write bodies
//! into validated `NewBook`s.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, ServiceError};
use crate::models::{AuthorRef, FilterSpec, ListOptions, NewBook};

/// Longest accepted title and image, in characters.
pub const MAX_FIELD_LEN: usize = 255;

/// Raw query parameters of a list request (`GET /books`).
///
/// `limit` and `offset` are pulled out and validated; every other parameter,
/// `order` included, is passed through to the filter untouched.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub filter: FilterSpec,
}

impl ListParams {
    /// Groups raw `(name, value)` pairs as they appear in the query string.
    ///
    /// Only the first `limit`/`offset` occurrence counts.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Self::default();

        for (name, value) in pairs {
            match name.as_str() {
                "limit" => {
                    params.limit.get_or_insert(value);
                }
                "offset" => {
                    params.offset.get_or_insert(value);
                }
                _ => params.filter.push(name, value),
            }
        }

        params
    }

    /// Resolves the page size: `default_limit` when absent, unparseable or
    /// not positive, otherwise clamped to `max_limit`.
    pub fn limit(&self, default_limit: u32, max_limit: u32) -> u32 {
        match self.limit.as_deref().and_then(parse_integer) {
            Some(limit) if limit > 0 => limit.min(i128::from(max_limit)) as u32,
            _ => default_limit.min(max_limit),
        }
    }

    /// Resolves the offset: 0 when absent, unparseable or negative.
    pub fn offset(&self) -> u64 {
        match self.offset.as_deref().and_then(parse_integer) {
            Some(offset) if offset >= 0 => u64::try_from(offset).unwrap_or(u64::MAX),
            _ => 0,
        }
    }

    /// Builds the normalized options for this request.
    pub fn into_options(self, default_limit: u32, max_limit: u32) -> ListOptions {
        let limit = self.limit(default_limit, max_limit);
        let offset = self.offset();
        ListOptions::new(limit, offset, self.filter)
    }
}

/// Parses a signed decimal integer. A run of digits too long for `i128` is
/// still a (huge) positive number and saturates instead of being rejected.
fn parse_integer(raw: &str) -> Option<i128> {
    let raw = raw.trim();
    match raw.parse::<i128>() {
        Ok(value) => Some(value),
        Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => Some(i128::MAX),
        Err(_) => None,
    }
}

// == Book Payload ==
/// Body of `POST /books` and `PUT /books/:id`.
///
/// Fields stay raw JSON so that a value of the wrong type is rejected with the
/// same message as a missing one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPayload {
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub description: Value,
    #[serde(default)]
    pub image: Value,
    #[serde(default)]
    pub date: Value,
    /// Author name, used when `author_id` is absent or zero
    #[serde(default)]
    pub author: Value,
    #[serde(default)]
    pub author_id: Value,
}

impl BookPayload {
    /// Parses a request body. An empty body reads as an empty object.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(value @ Value::Object(_)) => {
                serde_json::from_value(value).map_err(|_| invalid("Incorrect book object"))
            }
            _ => Err(invalid("Incorrect book object")),
        }
    }

    // == Validate ==
    /// Checks every field, in order, and stops at the first bad one.
    ///
    /// - `title`: non-empty string of at most 255 characters
    /// - `description`: non-empty string
    /// - `image`: non-empty string of at most 255 characters
    /// - `date`: a real calendar date written exactly as `YYYY-MM-DD`
    /// - `author_id`: a positive integer when present and non-zero, otherwise
    ///   `author` must be a non-empty name
    ///
    /// Whether the author exists is checked by storage.
    pub fn validate(self) -> Result<NewBook> {
        let title = required_text(self.title, Some(MAX_FIELD_LEN))
            .ok_or_else(|| invalid("Incorrect book title"))?;
        let description = required_text(self.description, None)
            .ok_or_else(|| invalid("Incorrect book description"))?;
        let image = required_text(self.image, Some(MAX_FIELD_LEN))
            .ok_or_else(|| invalid("Incorrect book image"))?;
        let date = match self.date {
            Value::String(date) if is_calendar_date(&date) => date,
            _ => return Err(invalid("Incorrect book date")),
        };

        let author = match self.author_id {
            Value::Number(id) if id.as_f64() != Some(0.0) => {
                let id = id
                    .as_u64()
                    .or_else(|| {
                        id.as_f64()
                            .filter(|v| v.fract() == 0.0 && *v <= u64::MAX as f64)
                            .map(|v| v as u64)
                    })
                    .filter(|id| *id >= 1)
                    .ok_or_else(|| invalid("Incorrect author id"))?;
                AuthorRef::Id(id)
            }
            _ => AuthorRef::Name(
                required_text(self.author, None)
                    .ok_or_else(|| invalid("Incorrect book author"))?,
            ),
        };

        Ok(NewBook {
            title,
            description,
            image,
            date,
            author,
        })
    }
}

fn invalid(message: &str) -> ServiceError {
    ServiceError::Validation(message.to_string())
}

fn required_text(value: Value, max_len: Option<usize>) -> Option<String> {
    match value {
        Value::String(text)
            if !text.is_empty() && max_len.map_or(true, |max| text.chars().count() <= max) =>
        {
            Some(text)
        }
        _ => None,
    }
}

/// Strict `YYYY-MM-DD`: zero-padded, no surrounding text, and a date that
/// exists in the calendar.
fn is_calendar_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
        && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
