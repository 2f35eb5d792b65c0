use biblio_db::{Document, ObjectId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use time::{
    format_description::{well_known::Rfc3339, BorrowedFormatItem},
    macros::format_description,
    Date, OffsetDateTime,
};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Names of the editable fields, in the order they are reported to clients.
pub const BOOK_FIELDS: [&str; 4] = ["title", "author", "genre", "publication_date"];

/// A literary work record as stored in the `books` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Store-generated identifier, absent until the first insert
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub author: String,
    pub genre: String,
    /// Serialized as `YYYY-MM-DD`
    pub publication_date: Date,
}

impl Document for Book {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

/// Raw request body for create and update requests.
///
/// Values are kept untyped so that missing, empty and mistyped fields can be
/// told apart the way a document mapper would.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPayload {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub author: Option<Value>,
    #[serde(default)]
    pub genre: Option<Value>,
    #[serde(default)]
    pub publication_date: Option<Value>,
}

/// A value could not be converted to the field's type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cast to {kind} failed for value {value} (type {type_name}) at path \"{path}\"")]
pub struct CastError {
    pub kind: &'static str,
    pub value: String,
    pub type_name: &'static str,
    pub path: &'static str,
}

impl CastError {
    fn new(kind: &'static str, path: &'static str, value: &Value) -> Self {
        Self {
            kind,
            value: value.to_string(),
            type_name: json_type_name(value),
            path,
        }
    }
}

/// Create was attempted without every required field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", .missing.join(", "))]
pub struct MissingFields {
    pub missing: Vec<&'static str>,
}

/// Per-field optional values. `None` keeps whatever the book already has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub publication_date: Option<Date>,
}

impl BookPayload {
    /// Names of fields that are absent or falsy.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        BOOK_FIELDS
            .iter()
            .zip(self.values())
            .filter(|(_, value)| supplied(value).is_none())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Coerce every supplied field. Falsy values count as not supplied.
    pub fn into_patch(self) -> Result<BookPatch, CastError> {
        Ok(BookPatch {
            title: supplied(&self.title)
                .map(|v| coerce_text("title", v))
                .transpose()?,
            author: supplied(&self.author)
                .map(|v| coerce_text("author", v))
                .transpose()?,
            genre: supplied(&self.genre)
                .map(|v| coerce_text("genre", v))
                .transpose()?,
            publication_date: supplied(&self.publication_date)
                .map(|v| coerce_date("publication_date", v))
                .transpose()?,
        })
    }

    fn values(&self) -> [&Option<Value>; 4] {
        [
            &self.title,
            &self.author,
            &self.genre,
            &self.publication_date,
        ]
    }
}

impl BookPatch {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.genre.is_none()
            && self.publication_date.is_none()
    }

    /// Overlay the supplied fields on `book`, keeping existing values otherwise.
    pub fn apply_to(self, book: Book) -> Book {
        Book {
            id: book.id,
            title: self.title.unwrap_or(book.title),
            author: self.author.unwrap_or(book.author),
            genre: self.genre.unwrap_or(book.genre),
            publication_date: self.publication_date.unwrap_or(book.publication_date),
        }
    }

    /// Build a new, unsaved book. Every field must be present.
    pub fn into_new_book(self) -> Result<Book, MissingFields> {
        match self {
            BookPatch {
                title: Some(title),
                author: Some(author),
                genre: Some(genre),
                publication_date: Some(publication_date),
            } => Ok(Book {
                id: None,
                title,
                author,
                genre,
                publication_date,
            }),
            partial => {
                let present = [
                    partial.title.is_some(),
                    partial.author.is_some(),
                    partial.genre.is_some(),
                    partial.publication_date.is_some(),
                ];
                Err(MissingFields {
                    missing: BOOK_FIELDS
                        .iter()
                        .zip(present)
                        .filter(|(_, present)| !present)
                        .map(|(name, _)| *name)
                        .collect(),
                })
            }
        }
    }
}

/// The value if it is present and truthy.
fn supplied(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| is_truthy(v))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn coerce_text(path: &'static str, value: &Value) -> Result<String, CastError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(CastError::new("string", path, other)),
    }
}

fn coerce_date(path: &'static str, value: &Value) -> Result<Date, CastError> {
    let parsed = match value {
        Value::String(s) => Date::parse(s, DATE_FORMAT)
            .ok()
            .or_else(|| OffsetDateTime::parse(s, &Rfc3339).ok().map(|dt| dt.date())),
        // Epoch milliseconds.
        Value::Number(n) => n
            .as_i64()
            .map(|ms| i128::from(ms) * 1_000_000)
            .and_then(|nanos| OffsetDateTime::from_unix_timestamp_nanos(nanos).ok())
            .map(|dt| dt.date()),
        _ => None,
    };

    parsed.ok_or_else(|| CastError::new("date", path, value))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}
