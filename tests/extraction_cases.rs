mod common;

use chrono::NaiveDate;
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use tabledoc_ingest::{DiscrepancyType, ExtractOptions, parse_file, parse_source};
use tempfile::tempdir;

fn grid(entries: &[(&str, Vec<(&str, &str)>)]) -> IndexMap<String, IndexMap<String, String>> {
    entries
        .iter()
        .map(|(outer, inner)| {
            (
                (*outer).to_string(),
                inner
                    .iter()
                    .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
                    .collect(),
            )
        })
        .collect()
}

#[test]
fn extracts_every_field_of_a_well_formed_table() {
    let parsed = parse_source(common::LOSS_ADJUSTER_TABLE, &ExtractOptions::default());
    let document = parsed.document;

    assert!(
        parsed.discrepancies.is_empty(),
        "unexpected discrepancies: {:?}",
        parsed.discrepancies
    );
    assert_eq!(
        document.document_id.as_deref(),
        Some("Table5999962Lossadjusterchartered")
    );
    assert_eq!(
        document.title.as_deref(),
        Some("Table 59.99.9.62 Loss adjuster, chartered")
    );
    assert_eq!(
        document.headers,
        Some(vec![
            "Daniel Brown".to_string(),
            "Shane Barnes DDS".to_string(),
            "Nicole Carpenter".to_string(),
            "Kristin Duarte".to_string(),
        ])
    );
    assert_eq!(
        document.body_by_columns,
        Some(grid(&[
            ("Daniel Brown", vec![("Roberts LLC", "1060")]),
            ("Kristin Duarte", vec![("Roberts LLC", "1364")]),
            ("Nicole Carpenter", vec![("Roberts LLC", "1593")]),
            ("Shane Barnes DDS", vec![("Roberts LLC", "37")]),
        ]))
    );
    assert_eq!(
        document.body_by_rows,
        Some(grid(&[(
            "Roberts LLC",
            vec![
                ("Daniel Brown", "1060"),
                ("Kristin Duarte", "1364"),
                ("Nicole Carpenter", "1593"),
                ("Shane Barnes DDS", "37"),
            ]
        )]))
    );
    assert_eq!(
        document.rows_list,
        Some(vec![vec![
            "Roberts LLC".to_string(),
            "1060".to_string(),
            "37".to_string(),
            "1593".to_string(),
            "1364".to_string(),
        ]])
    );
    assert_eq!(document.sum_of_first_row, Some(4054));
    assert_eq!(document.footer.as_deref(), Some("Creation: 3Feb2013 Chad"));
    assert_eq!(document.country_of_creation.as_deref(), Some("Chad"));
    assert_eq!(
        document.date_of_creation,
        NaiveDate::from_ymd_opt(2013, 2, 3).and_then(|date| date.and_hms_opt(0, 0, 0))
    );
}

#[test]
fn fills_missing_headers_for_wide_bodies() {
    let parsed = parse_source(common::WIDE_BODY_TABLE, &ExtractOptions::default());
    let document = parsed.document;

    let by_rows = document.body_by_rows.expect("body should be extracted");
    assert_eq!(
        by_rows["Reeves-George"].get("empty_header_0").map(String::as_str),
        Some("587")
    );
    assert_eq!(
        document.headers.map(|headers| headers.len()),
        Some(3),
        "stored headers are not padded"
    );
    assert_eq!(document.sum_of_first_row, Some(4032));
    assert_eq!(
        document.country_of_creation.as_deref(),
        Some("Bosnia and Herzegovina")
    );
    assert_eq!(
        document.date_of_creation,
        NaiveDate::from_ymd_opt(2022, 8, 31).and_then(|date| date.and_hms_opt(0, 0, 0))
    );
}

#[test]
fn drops_extra_cells_without_filling_but_keeps_raw_rows() {
    let options = ExtractOptions {
        fill_missing_headers: false,
    };
    let document = parse_source(common::WIDE_BODY_TABLE, &options).document;

    let by_columns = document.body_by_columns.expect("body should be extracted");
    assert_eq!(
        by_columns.keys().cloned().collect::<Vec<_>>(),
        vec!["Kenneth Decker", "Benjamin Newman", "Susan Miller"]
    );
    let rows = document.rows_list.expect("rows should be extracted");
    assert_eq!(rows[1], vec!["Atkinson and Sons", "846%", "356", "850%", "1060"]);
}

#[test]
fn percentage_in_first_row_flags_invalid_sum() {
    let source = common::WIDE_BODY_TABLE.replace("<td>699</td>", "<td>699%</td>");
    let parsed = parse_source(&source, &ExtractOptions::default());

    let invalid = parsed
        .discrepancies
        .iter()
        .filter(|discrepancy| discrepancy.discrepancy_type == DiscrepancyType::InvalidSum)
        .collect::<Vec<_>>();
    assert_eq!(invalid.len(), 1);
    assert_eq!(parsed.document.sum_of_first_row, Some(3333));
}

#[test]
fn missing_footer_is_reported_once_per_document() {
    let dir = tempdir().expect("tempdir should be created");
    common::write_fixture(dir.path(), "3_table.html", common::NO_FOOTER_TABLE);

    let parsed = parse_file(&dir.path().join("3_table.html"), &ExtractOptions::default())
        .expect("file should parse");

    let kinds = parsed
        .discrepancies
        .iter()
        .map(|discrepancy| discrepancy.discrepancy_type)
        .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            DiscrepancyType::MissingDocumentId,
            DiscrepancyType::MissingFooter
        ]
    );
    assert!(parsed.document.country_of_creation.is_none());
    assert!(parsed.document.date_of_creation.is_none());
    assert_eq!(
        parsed.discrepancies[1].file_name.as_deref(),
        Some("3_table.html")
    );
}

#[test]
fn blank_title_points_at_caption_line() {
    let source = common::LOSS_ADJUSTER_TABLE.replace(
        "Table 59.99.9.62 Loss adjuster, chartered",
        "   ",
    );
    let parsed = parse_source(&source, &ExtractOptions::default());

    assert_eq!(parsed.document.title, None);
    assert_eq!(parsed.discrepancies.len(), 1);
    assert_eq!(
        parsed.discrepancies[0].discrepancy_type,
        DiscrepancyType::MissingTitle
    );
    assert_eq!(parsed.discrepancies[0].location, Some(4));
}

#[test]
fn decodes_invalid_utf8_without_failing() {
    let dir = tempdir().expect("tempdir should be created");
    let path = dir.path().join("0_table.html");
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice(common::LOSS_ADJUSTER_TABLE.as_bytes());
    bytes.extend_from_slice(b"<!-- \xFF -->");
    std::fs::write(&path, bytes).expect("fixture should be written");

    let parsed = parse_file(&path, &ExtractOptions::default()).expect("file should parse");
    assert_eq!(
        parsed.document.document_id.as_deref(),
        Some("Table5999962Lossadjusterchartered")
    );
    assert!(parsed.discrepancies.is_empty());
}

#[test]
fn bare_footer_text_still_yields_country_and_date() {
    let source = common::LOSS_ADJUSTER_TABLE.replace(
        "<tr><td>Creation: 3Feb2013 Chad</td></tr>",
        "Creation: 3Feb2013 Chad",
    );
    let parsed = parse_source(&source, &ExtractOptions::default());

    assert!(
        parsed.discrepancies.is_empty(),
        "unexpected discrepancies: {:?}",
        parsed.discrepancies
    );
    assert_eq!(
        parsed.document.footer.as_deref(),
        Some("Creation: 3Feb2013 Chad")
    );
    assert_eq!(parsed.document.country_of_creation.as_deref(), Some("Chad"));
    assert_eq!(
        parsed.document.date_of_creation,
        NaiveDate::from_ymd_opt(2013, 2, 3).and_then(|date| date.and_hms_opt(0, 0, 0))
    );
}
