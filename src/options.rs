use chrono::{NaiveDate, NaiveDateTime};

use crate::error::IngestError;

/// Extensions accepted when scanning a directory for table documents.
pub const VALID_FILE_EXTENSIONS: [&str; 2] = ["html", "htm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Pad the header list with `empty_header_<i>` labels when the first body
    /// row has more data cells than there are headers. When disabled, data
    /// cells past the last header are dropped from the column/row maps.
    pub fill_missing_headers: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            fill_missing_headers: true,
        }
    }
}

/// Thresholds for the validation rules; `None` skips the rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    pub max_headers_length: Option<usize>,
    pub late_date: Option<NaiveDateTime>,
    pub high_sum: Option<i64>,
}

/// Parses `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_threshold_date(value: &str) -> Result<NaiveDateTime, IngestError> {
    let value = value.trim();
    if let Ok(date_time) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(date_time);
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN))
        .map_err(|error| {
            IngestError::InvalidOption(format!("invalid date '{value}': {error}"))
        })
}
