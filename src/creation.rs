//! Country and date of creation, both read out of the table footer.
//!
//! Footers look like `Creation: 3Feb2013 Chad`: a fixed prefix, a compact
//! date token and a free-text country name, in no guaranteed order.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;
use tracing::{debug, warn};

use crate::country::search_fuzzy;
use crate::discrepancy::{Discrepancy, DiscrepancyType};
use crate::fields::extract_footer;
use crate::html::{SourceDocument, Tag};

pub const CREATION_PREFIX: &str = "Creation: ";

// 1-2 digits, 3-9 letters, 2-4 digits
static DATE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,2}[A-Za-z]{3,9}\d{2,4}").expect("hardcoded date token regex is valid")
});

#[must_use]
pub fn find_date_token(footer: &str) -> Option<&str> {
    DATE_TOKEN_RE.find(footer).map(|found| found.as_str())
}

/// Parses a `<day><month name><year>` token such as `3Feb2013` or `21sept99`.
#[must_use]
pub fn parse_date_token(token: &str) -> Option<NaiveDateTime> {
    parse_date_token_in(token, Utc::now().year())
}

fn parse_date_token_in(token: &str, this_year: i32) -> Option<NaiveDateTime> {
    let letters_start = token.find(|ch: char| !ch.is_ascii_digit())?;
    let (day, rest) = token.split_at(letters_start);
    let digits_start = rest.find(|ch: char| ch.is_ascii_digit())?;
    let (month, year) = rest.split_at(digits_start);
    if !year.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    let day = day.parse::<u32>().ok()?;
    let month = month_number(month)?;
    let mut year_value = year.parse::<i32>().ok()?;
    if year.len() <= 2 {
        year_value = resolve_two_digit_year(year_value, this_year);
    }

    NaiveDate::from_ymd_opt(year_value, month, day).map(|date| date.and_time(NaiveTime::MIN))
}

/// Places a two-digit year in the century that keeps it within 50 years of
/// `this_year`.
fn resolve_two_digit_year(two_digit: i32, this_year: i32) -> i32 {
    let year = two_digit + this_year / 100 * 100;
    if year >= this_year + 50 {
        year - 100
    } else if year < this_year - 50 {
        year + 100
    } else {
        year
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_ascii_lowercase().as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

fn footer_line(doc: &SourceDocument) -> Option<u32> {
    doc.first(Tag::Tfoot).and_then(|foot| foot.line())
}

/// Country named in the footer, resolved to its canonical name when possible.
///
/// A name the lookup cannot resolve is logged and returned as written.
pub fn extract_country_of_creation(
    doc: &SourceDocument,
    discrepancies: &mut Vec<Discrepancy>,
) -> Option<String> {
    let footer = extract_footer(doc, false, discrepancies)?;

    let mut remainder = footer.replace(CREATION_PREFIX, "").trim().to_string();
    if let Some(token) = find_date_token(&footer) {
        remainder = remainder.replace(token, "").trim().to_string();
    }

    if remainder.is_empty() {
        discrepancies.push(
            Discrepancy::new(DiscrepancyType::MissingCountry)
                .with_raw_data(remainder)
                .with_description("Didn't find country in footer")
                .with_location(footer_line(doc)),
        );
        return None;
    }

    if let Some(country) = search_fuzzy(&remainder) {
        return Some(country.name.to_string());
    }

    warn!(country = %remainder, "failed to find country");
    Some(remainder)
}

pub fn extract_date_of_creation(
    doc: &SourceDocument,
    discrepancies: &mut Vec<Discrepancy>,
) -> Option<NaiveDateTime> {
    let footer = extract_footer(doc, false, discrepancies)?;

    let Some(token) = find_date_token(&footer) else {
        discrepancies.push(
            Discrepancy::new(DiscrepancyType::MissingCreationDate)
                .with_raw_data(footer.as_str())
                .with_description("Didn't find date in footer")
                .with_location(footer_line(doc)),
        );
        return None;
    };

    if let Some(date) = parse_date_token(token) {
        debug!(token, %date, "date parsed");
        return Some(date);
    }

    warn!(footer = %footer, "failed to parse date from footer");
    discrepancies.push(
        Discrepancy::new(DiscrepancyType::IncorrectCreationDate)
            .with_raw_data(footer.as_str())
            .with_description("Failed to parse date from footer")
            .with_location(footer_line(doc)),
    );
    None
}
