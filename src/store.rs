//! Document store backing the ingest pipeline and the validation rules.
//!
//! Each collection is a SQLite table of JSON documents. Queries run against
//! the JSON body with SQLite's built-in JSON functions, so a collection behaves
//! like a small schemaless document store.
//!
//! ```no_run
//! use tabledoc_ingest::{Store, TableDocument};
//!
//! let store = Store::open("table_documents.db").unwrap();
//! let tables = store.collection::<TableDocument>("tables").unwrap();
//! # let _ = tables;
//! ```

use std::marker::PhantomData;
use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::discrepancy::Discrepancy;
use crate::error::IngestError;
use crate::model::TableDocument;

/// A value that can be stored in a [`Collection`].
pub trait Document: Serialize + DeserializeOwned {
    /// Identity used by [`Collection::upsert`]; `None` is a valid key and
    /// matches other documents without one.
    fn key(&self) -> Option<&str>;
}

impl Document for TableDocument {
    fn key(&self) -> Option<&str> {
        self.document_id.as_deref()
    }
}

impl Document for Discrepancy {
    fn key(&self) -> Option<&str> {
        None
    }
}

/// Query over the top-level fields of stored documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    /// Field equals a scalar; `Value::Null` also matches an absent field.
    Eq(String, Value),
    /// Field is strictly greater than a number or string. Null never matches.
    Gt(String, Value),
    /// The field's compact JSON rendering (`null` when absent) is shorter
    /// than the given number of characters.
    JsonLengthLt(String, usize),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gt(field.into(), value.into())
    }

    fn to_sql(&self) -> Result<(String, Vec<SqlValue>), IngestError> {
        match self {
            Self::All => Ok(("1 = 1".to_string(), Vec::new())),
            Self::Eq(field, Value::Null) => {
                let path = json_path(field)?;
                Ok((format!("json_extract(body, '{path}') IS NULL"), Vec::new()))
            }
            Self::Eq(field, value) => {
                let path = json_path(field)?;
                Ok((
                    format!("json_extract(body, '{path}') = ?"),
                    vec![scalar(field, value)?],
                ))
            }
            Self::Gt(field, value) => {
                let path = json_path(field)?;
                Ok((
                    format!("json_extract(body, '{path}') > ?"),
                    vec![scalar(field, value)?],
                ))
            }
            Self::JsonLengthLt(field, length) => {
                let path = json_path(field)?;
                let length = i64::try_from(*length).unwrap_or(i64::MAX);
                Ok((
                    format!("length(coalesce(body -> '{path}', 'null')) < ?"),
                    vec![SqlValue::Integer(length)],
                ))
            }
        }
    }
}

fn json_path(field: &str) -> Result<String, IngestError> {
    if is_identifier(field) {
        Ok(format!("$.{field}"))
    } else {
        Err(IngestError::InvalidField(field.to_string()))
    }
}

fn scalar(field: &str, value: &Value) -> Result<SqlValue, IngestError> {
    match value {
        Value::Bool(flag) => Ok(SqlValue::Integer(i64::from(*flag))),
        Value::Number(number) => number
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| number.as_f64().map(SqlValue::Real))
            .ok_or_else(|| IngestError::InvalidField(format!("{field}: unsupported number"))),
        Value::String(text) => Ok(SqlValue::Text(text.clone())),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(IngestError::InvalidField(
            format!("{field}: only scalar values can be compared"),
        )),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Handle to the document store.
///
/// Open it once, hand out collections by reference, and [`close`](Self::close)
/// it on shutdown.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IngestError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, IngestError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Returns the named collection, creating its table on first use.
    pub fn collection<T: Document>(&self, name: &str) -> Result<Collection<'_, T>, IngestError> {
        if !is_identifier(name) {
            return Err(IngestError::InvalidCollection(name.to_string()));
        }

        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{name}\" (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 doc_key TEXT,
                 body TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS \"{name}_doc_key\" ON \"{name}\" (doc_key);"
        ))?;

        Ok(Collection {
            conn: &self.conn,
            name: name.to_string(),
            _marker: PhantomData,
        })
    }

    pub fn close(self) -> Result<(), IngestError> {
        self.conn.close().map_err(|(_, error)| error.into())
    }
}

/// Typed view of one collection in a [`Store`].
pub struct Collection<'a, T> {
    conn: &'a Connection,
    name: String,
    _marker: PhantomData<T>,
}

impl<T: Document> Collection<'_, T> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the first document with the same key, or inserts a new one.
    pub fn upsert(&self, document: &T) -> Result<(), IngestError> {
        let body = serde_json::to_string(document)?;
        let key = document.key();

        let existing = self
            .conn
            .query_row(
                &format!(
                    "SELECT id FROM \"{}\" WHERE doc_key IS ?1 ORDER BY id LIMIT 1",
                    self.name
                ),
                params![key],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        match existing {
            Some(id) => {
                self.conn.execute(
                    &format!("UPDATE \"{}\" SET body = ?1 WHERE id = ?2", self.name),
                    params![body, id],
                )?;
            }
            None => self.insert_body(key, &body)?,
        }
        Ok(())
    }

    /// Appends every document in one transaction.
    pub fn insert_many(&self, documents: &[T]) -> Result<(), IngestError> {
        let tx = self.conn.unchecked_transaction()?;
        for document in documents {
            let body = serde_json::to_string(document)?;
            self.insert_body(document.key(), &body)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn insert_body(&self, key: Option<&str>, body: &str) -> Result<(), IngestError> {
        self.conn.execute(
            &format!(
                "INSERT INTO \"{}\" (doc_key, body) VALUES (?1, ?2)",
                self.name
            ),
            params![key, body],
        )?;
        Ok(())
    }

    /// Matching documents in insertion order.
    pub fn find(&self, filter: &Filter) -> Result<Vec<T>, IngestError> {
        self.find_raw(filter)?
            .iter()
            .map(|body| serde_json::from_str(body).map_err(IngestError::from))
            .collect()
    }

    pub fn find_one(&self, filter: &Filter) -> Result<Option<T>, IngestError> {
        let (clause, values) = filter.to_sql()?;
        let body = self
            .conn
            .query_row(
                &format!(
                    "SELECT body FROM \"{}\" WHERE {clause} ORDER BY id LIMIT 1",
                    self.name
                ),
                params_from_iter(values),
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        body.map(|body| serde_json::from_str(&body))
            .transpose()
            .map_err(IngestError::from)
    }

    /// Matching documents as untyped JSON, in insertion order.
    pub fn find_values(&self, filter: &Filter) -> Result<Vec<Value>, IngestError> {
        self.find_raw(filter)?
            .iter()
            .map(|body| serde_json::from_str(body).map_err(IngestError::from))
            .collect()
    }

    pub fn count(&self, filter: &Filter) -> Result<usize, IngestError> {
        let (clause, values) = filter.to_sql()?;
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\" WHERE {clause}", self.name),
            params_from_iter(values),
            |row| row.get::<_, i64>(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn find_raw(&self, filter: &Filter) -> Result<Vec<String>, IngestError> {
        let (clause, values) = filter.to_sql()?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT body FROM \"{}\" WHERE {clause} ORDER BY id",
            self.name
        ))?;
        let bodies = stmt
            .query_map(params_from_iter(values), |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bodies)
    }
}
