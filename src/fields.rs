//! Per-field extractors over a parsed table document.
//!
//! Every extractor is total: malformed markup yields `None` plus one or more
//! entries pushed onto the caller's discrepancy list, never an error.

use crate::discrepancy::{Discrepancy, DiscrepancyType};
use crate::html::{SourceDocument, Tag, markup_list};
use crate::model::ParsedBody;
use crate::options::ExtractOptions;

pub const EMPTY_HEADER_PREFIX: &str = "empty_header_";

pub fn extract_document_id(
    doc: &SourceDocument,
    discrepancies: &mut Vec<Discrepancy>,
) -> Option<String> {
    let table = doc.first(Tag::Table);
    if let Some(id) = table.and_then(|table| table.attr("id")).filter(|id| !id.is_empty()) {
        return Some(id.to_string());
    }

    let mut discrepancy = Discrepancy::new(DiscrepancyType::MissingDocumentId);
    if let Some(table) = table {
        discrepancy = discrepancy.with_raw_data(table.markup());
    }
    discrepancies.push(discrepancy);
    None
}

pub fn extract_title(doc: &SourceDocument, discrepancies: &mut Vec<Discrepancy>) -> Option<String> {
    let Some(caption) = doc.first(Tag::Caption) else {
        discrepancies.push(
            Discrepancy::new(DiscrepancyType::MissingTitle).with_description("No title tag found"),
        );
        return None;
    };

    let title = caption.text().trim().to_string();
    if !title.is_empty() {
        return Some(title);
    }

    discrepancies.push(
        Discrepancy::new(DiscrepancyType::MissingTitle)
            .with_raw_data(caption.markup())
            .with_description("Empty title tag")
            .with_location(caption.line()),
    );
    None
}

pub fn extract_headers(
    doc: &SourceDocument,
    discrepancies: &mut Vec<Discrepancy>,
) -> Option<Vec<String>> {
    let Some(head) = doc.first(Tag::Thead) else {
        discrepancies.push(
            Discrepancy::new(DiscrepancyType::MissingHeaders).with_description("No thead tag found"),
        );
        return None;
    };

    let cells = head.select(Tag::Th);
    let headers = cells
        .iter()
        .map(|cell| cell.text().trim().to_string())
        .filter(|header| !header.is_empty())
        .collect::<Vec<_>>();
    if !headers.is_empty() {
        return Some(headers);
    }

    discrepancies.push(
        Discrepancy::new(DiscrepancyType::MissingHeaders)
            .with_raw_data(markup_list(&cells))
            .with_description("Empty headers")
            .with_location(cells.first().and_then(|cell| cell.line())),
    );
    None
}

/// Builds the column-major, row-major and raw-row views of the table body in
/// one pass.
///
/// Headers are looked up again here; a header miss is already reported by
/// [`extract_headers`], so it is not reported a second time and the body is
/// parsed against an empty header list instead.
pub fn extract_body(
    doc: &SourceDocument,
    options: &ExtractOptions,
    discrepancies: &mut Vec<Discrepancy>,
) -> Option<ParsedBody> {
    let mut headers = extract_headers(doc, &mut Vec::new()).unwrap_or_default();

    let Some(body) = doc.first(Tag::Tbody) else {
        discrepancies.push(
            Discrepancy::new(DiscrepancyType::MissingBody).with_description("No tbody tag found"),
        );
        return None;
    };

    let rows = body
        .select(Tag::Tr)
        .iter()
        .map(|row| {
            row.select(Tag::Td)
                .iter()
                .map(|cell| cell.text().trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect::<Vec<_>>();

    if options.fill_missing_headers {
        if let Some(first) = rows.first() {
            fill_missing_headers(&mut headers, first.len() - 1);
        }
    }

    let mut parsed = ParsedBody::default();
    for cells in rows {
        let label = &cells[0];
        let data = &cells[1..];
        let data = if options.fill_missing_headers {
            data
        } else {
            &data[..data.len().min(headers.len())]
        };

        for (header, value) in headers.iter().zip(data) {
            parsed
                .by_columns
                .entry(header.clone())
                .or_default()
                .insert(label.clone(), value.clone());
            parsed
                .by_rows
                .entry(label.clone())
                .or_default()
                .insert(header.clone(), value.clone());
        }
        parsed.rows.push(cells);
    }

    Some(parsed)
}

fn fill_missing_headers(headers: &mut Vec<String>, data_columns: usize) {
    let missing = data_columns.saturating_sub(headers.len());
    headers.extend((0..missing).map(|index| format!("{EMPTY_HEADER_PREFIX}{index}")));
}

/// Sums the data cells (index 1 onward) of a raw body row.
///
/// Any cell that is not a non-negative integer literal flags the row with
/// `INVALID_SUM`, but the sum over the numeric cells is still returned.
pub fn sum_first_row(row: &[String], discrepancies: &mut Vec<Discrepancy>) -> Option<i64> {
    let data = row.get(1..).unwrap_or_default();

    let mut sum = 0_i64;
    let mut all_numeric = true;
    for cell in data {
        match parse_non_negative(cell) {
            Some(value) => sum = sum.saturating_add(value),
            None => all_numeric = false,
        }
    }

    if !all_numeric {
        discrepancies.push(
            Discrepancy::new(DiscrepancyType::InvalidSum)
                .with_raw_data(format!("{row:?}"))
                .with_description("First row doesn't contain only numbers"),
        );
    }

    Some(sum)
}

fn parse_non_negative(cell: &str) -> Option<i64> {
    if cell.is_empty() || !cell.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    cell.parse().ok()
}

/// Footer text, trimmed.
///
/// `emit_discrepancy_on_miss` is `true` only for the whole-document pass;
/// the country and date extractors read the footer with `false` so a missing
/// footer is reported once per document.
pub fn extract_footer(
    doc: &SourceDocument,
    emit_discrepancy_on_miss: bool,
    discrepancies: &mut Vec<Discrepancy>,
) -> Option<String> {
    let Some(foot) = doc.first(Tag::Tfoot) else {
        if emit_discrepancy_on_miss {
            discrepancies.push(
                Discrepancy::new(DiscrepancyType::MissingFooter)
                    .with_description("No tfoot tag found"),
            );
        }
        return None;
    };

    let footer = foot.source_text().trim().to_string();
    if !footer.is_empty() {
        return Some(footer);
    }

    if emit_discrepancy_on_miss {
        discrepancies.push(
            Discrepancy::new(DiscrepancyType::MissingFooter)
                .with_raw_data(foot.markup())
                .with_description("Empty footer tag")
                .with_location(foot.line()),
        );
    }
    None
}
