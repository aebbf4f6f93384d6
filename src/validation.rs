//! Batch validation rules over the persisted corpus.
//!
//! Rules run in a fixed order (short headers, late date, high sum, saved
//! discrepancies) and append to one list of findings. Nothing is
//! deduplicated: a record caught by two rules appears twice.

use serde_json::{Map, Value, json};

use crate::discrepancy::{Discrepancy, DiscrepancyType};
use crate::error::IngestError;
use crate::model::{Finding, TableDocument, ValidationStatus};
use crate::options::ValidationOptions;
use crate::store::{Collection, Filter};

pub struct DocumentValidator<'a> {
    records: &'a Collection<'a, TableDocument>,
    discrepancies: &'a Collection<'a, Discrepancy>,
    options: ValidationOptions,
    findings: Vec<Finding>,
}

impl<'a> DocumentValidator<'a> {
    #[must_use]
    pub fn new(
        records: &'a Collection<'a, TableDocument>,
        discrepancies: &'a Collection<'a, Discrepancy>,
        options: ValidationOptions,
    ) -> Self {
        Self {
            records,
            discrepancies,
            options,
            findings: Vec::new(),
        }
    }

    /// Runs every rule and returns all findings gathered so far.
    pub fn validate(mut self) -> Result<Vec<Finding>, IngestError> {
        self.collect_short_header_discrepancies()?;
        self.collect_late_date_discrepancies()?;
        self.collect_high_sum_discrepancies()?;
        self.collect_saved_discrepancies()?;
        Ok(self.findings)
    }

    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Records whose serialized header list is shorter than
    /// `max_headers_length` characters.
    pub fn collect_short_header_discrepancies(&mut self) -> Result<(), IngestError> {
        let Some(max_length) = self.options.max_headers_length else {
            return Ok(());
        };

        let filter = Filter::JsonLengthLt("headers".to_string(), max_length);
        for record in self.records.find(&filter)? {
            let headers = serde_json::to_value(&record.headers)?;
            let length = headers.to_string().chars().count();
            self.push_invalid(detail([
                ("headers", headers),
                ("length", json!(length)),
            ]));
        }
        Ok(())
    }

    pub fn collect_late_date_discrepancies(&mut self) -> Result<(), IngestError> {
        let Some(late_date) = self.options.late_date else {
            return Ok(());
        };

        let filter = Filter::gt("date_of_creation", serde_json::to_value(late_date)?);
        for record in self.records.find(&filter)? {
            self.push_invalid(detail([(
                "date_of_creation",
                serde_json::to_value(record.date_of_creation)?,
            )]));
        }
        Ok(())
    }

    /// Uses the sum precomputed at extraction time, so rows that were
    /// flagged `INVALID_SUM` still count with their numeric cells.
    pub fn collect_high_sum_discrepancies(&mut self) -> Result<(), IngestError> {
        let Some(high_sum) = self.options.high_sum else {
            return Ok(());
        };

        for record in self.records.find(&Filter::gt("sum_of_first_row", high_sum))? {
            self.push_invalid(detail([(
                "sum_of_first_row",
                json!(record.sum_of_first_row),
            )]));
        }
        Ok(())
    }

    pub fn collect_saved_discrepancies(&mut self) -> Result<(), IngestError> {
        for saved in self.discrepancies.find_values(&Filter::All)? {
            let status = classify(&saved);
            let Value::Object(detail) = saved else {
                continue;
            };
            self.findings.push(Finding::new(status, detail));
        }
        Ok(())
    }

    fn push_invalid(&mut self, detail: Map<String, Value>) {
        self.findings
            .push(Finding::new(ValidationStatus::Invalid, detail));
    }
}

fn classify(saved: &Value) -> ValidationStatus {
    let kind = saved
        .get("discrepancy_type")
        .cloned()
        .and_then(|kind| serde_json::from_value::<DiscrepancyType>(kind).ok());
    match kind {
        Some(kind) if kind.is_missing() => ValidationStatus::NotFound,
        _ => ValidationStatus::Invalid,
    }
}

fn detail<const N: usize>(fields: [(&str, Value); N]) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
