use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::creation::{extract_country_of_creation, extract_date_of_creation};
use crate::discrepancy::Discrepancy;
use crate::error::IngestError;
use crate::fields::{
    extract_body, extract_document_id, extract_footer, extract_headers, extract_title,
    sum_first_row,
};
use crate::html::SourceDocument;
use crate::model::TableDocument;
use crate::options::{ExtractOptions, VALID_FILE_EXTENSIONS};
use crate::store::Collection;

/// Extraction result for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    pub document: TableDocument,
    pub discrepancies: Vec<Discrepancy>,
}

/// Summary of a directory run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files_parsed: usize,
    pub documents_upserted: usize,
    pub discrepancies_by_file: BTreeMap<String, usize>,
}

impl IngestReport {
    #[must_use]
    pub fn discrepancy_count(&self) -> usize {
        self.discrepancies_by_file.values().sum()
    }
}

/// Runs every field extractor over one HTML source.
///
/// Never fails: fields that cannot be extracted are left `None` and the
/// reason is in the returned discrepancies (without a file name).
#[must_use]
pub fn parse_source(source: &str, options: &ExtractOptions) -> ParsedFile {
    let doc = SourceDocument::parse(source);
    let mut discrepancies = Vec::new();

    let mut document = TableDocument {
        document_id: extract_document_id(&doc, &mut discrepancies),
        title: extract_title(&doc, &mut discrepancies),
        headers: extract_headers(&doc, &mut discrepancies),
        ..TableDocument::default()
    };

    let body = extract_body(&doc, options, &mut discrepancies);
    document.sum_of_first_row = body
        .as_ref()
        .and_then(|body| body.rows.first())
        .and_then(|row| sum_first_row(row, &mut discrepancies));
    document.set_body(body);

    document.footer = extract_footer(&doc, true, &mut discrepancies);
    document.country_of_creation = extract_country_of_creation(&doc, &mut discrepancies);
    document.date_of_creation = extract_date_of_creation(&doc, &mut discrepancies);

    ParsedFile {
        document,
        discrepancies,
    }
}

/// Reads and extracts one file, tagging its discrepancies with the file name.
///
/// Only I/O failures are errors; the content is decoded as UTF-8 with
/// invalid bytes replaced.
pub fn parse_file(path: &Path, options: &ExtractOptions) -> Result<ParsedFile, IngestError> {
    let bytes = fs::read(path)?;
    let (source, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    if had_errors {
        warn!(path = %path.display(), "file is not valid UTF-8; invalid bytes replaced");
    }

    let mut parsed = parse_source(&source, options);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    for discrepancy in &mut parsed.discrepancies {
        discrepancy.file_name = Some(file_name.clone());
    }
    Ok(parsed)
}

/// Table-document files directly inside `dir`, in file-name order.
pub fn valid_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    if !dir.is_dir() {
        return Err(IngestError::NotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let has_valid_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| VALID_FILE_EXTENSIONS.contains(&ext));
        if has_valid_extension {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Extracts a directory of table documents into the store.
///
/// Files are handled one at a time: the record is upserted by
/// `document_id`, then that file's discrepancies are inserted as one batch.
/// Re-running over the same directory leaves records unchanged but inserts
/// every discrepancy again.
pub struct DocumentParser<'a> {
    records: &'a Collection<'a, TableDocument>,
    discrepancies: &'a Collection<'a, Discrepancy>,
    options: ExtractOptions,
}

impl<'a> DocumentParser<'a> {
    #[must_use]
    pub fn new(
        records: &'a Collection<'a, TableDocument>,
        discrepancies: &'a Collection<'a, Discrepancy>,
        options: ExtractOptions,
    ) -> Self {
        Self {
            records,
            discrepancies,
            options,
        }
    }

    pub fn parse(&self, dir: &Path) -> Result<IngestReport, IngestError> {
        let mut report = IngestReport::default();

        for path in valid_files(dir)? {
            let parsed = parse_file(&path, &self.options)?;
            report.files_parsed += 1;

            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            debug!(
                file = %file_name,
                collection = self.records.name(),
                "inserting document"
            );
            self.records.upsert(&parsed.document)?;
            report.documents_upserted += 1;

            if !parsed.discrepancies.is_empty() {
                warn!(
                    file = %file_name,
                    count = parsed.discrepancies.len(),
                    "saving discrepancies for file"
                );
                self.discrepancies.insert_many(&parsed.discrepancies)?;
                report
                    .discrepancies_by_file
                    .insert(file_name, parsed.discrepancies.len());
            }
        }

        info!(
            files = report.files_parsed,
            discrepancies = report.discrepancy_count(),
            "directory parsed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{parse_file, parse_source, valid_files};
    use crate::discrepancy::DiscrepancyType;
    use crate::error::IngestError;
    use crate::options::ExtractOptions;

    #[test]
    fn empty_document_is_still_returned() {
        let parsed = parse_source("", &ExtractOptions::default());

        assert_eq!(parsed.document, crate::TableDocument::default());
        let kinds = parsed
            .discrepancies
            .iter()
            .map(|discrepancy| discrepancy.discrepancy_type)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                DiscrepancyType::MissingDocumentId,
                DiscrepancyType::MissingTitle,
                DiscrepancyType::MissingHeaders,
                DiscrepancyType::MissingBody,
                DiscrepancyType::MissingFooter,
            ]
        );
    }

    #[test]
    fn tags_discrepancies_with_file_name() {
        let dir = tempdir().expect("tempdir should be created");
        let path = dir.path().join("7_table.html");
        fs::write(&path, "<table><caption>x</caption></table>").expect("fixture should be written");

        let parsed = parse_file(&path, &ExtractOptions::default()).expect("file should parse");
        assert!(!parsed.discrepancies.is_empty());
        assert!(
            parsed
                .discrepancies
                .iter()
                .all(|discrepancy| discrepancy.file_name.as_deref() == Some("7_table.html"))
        );
    }

    #[test]
    fn selects_html_files_only() {
        let dir = tempdir().expect("tempdir should be created");
        for name in ["b.html", "a.htm", "notes.txt", "c.HTML"] {
            fs::write(dir.path().join(name), "").expect("fixture should be written");
        }
        fs::create_dir(dir.path().join("nested.html")).expect("dir should be created");

        let names = valid_files(dir.path())
            .expect("listing should succeed")
            .iter()
            .filter_map(|path| path.file_name()?.to_str().map(ToString::to_string))
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a.htm", "b.html"]);
    }

    #[test]
    fn missing_directory_is_not_found() {
        let dir = tempdir().expect("tempdir should be created");
        let err = valid_files(&dir.path().join("absent")).expect_err("should fail");
        assert!(matches!(err, IngestError::NotFound(_)));
    }
}
