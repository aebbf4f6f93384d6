use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `header -> (row label -> cell)` or `row label -> (header -> cell)`.
pub type CellGrid = IndexMap<String, IndexMap<String, String>>;

/// Structured record extracted from one HTML table file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDocument {
    pub document_id: Option<String>,
    pub title: Option<String>,
    pub headers: Option<Vec<String>>,
    pub body_by_columns: Option<CellGrid>,
    pub body_by_rows: Option<CellGrid>,
    pub rows_list: Option<Vec<Vec<String>>>,
    pub sum_of_first_row: Option<i64>,
    pub footer: Option<String>,
    pub country_of_creation: Option<String>,
    pub date_of_creation: Option<NaiveDateTime>,
}

/// The three views of a table body, always produced together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBody {
    pub by_columns: CellGrid,
    pub by_rows: CellGrid,
    pub rows: Vec<Vec<String>>,
}

impl TableDocument {
    pub(crate) fn set_body(&mut self, body: Option<ParsedBody>) {
        if let Some(body) = body {
            self.body_by_columns = Some(body.by_columns);
            self.body_by_rows = Some(body.by_rows);
            self.rows_list = Some(body.rows);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    Error,
    NotFound,
    NotProcessed,
}

/// One validation result: a status and the stored fields that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub status: ValidationStatus,
    pub detail: Map<String, Value>,
}

impl Finding {
    #[must_use]
    pub fn new(status: ValidationStatus, detail: Map<String, Value>) -> Self {
        Self { status, detail }
    }
}
