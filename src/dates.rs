use chrono::NaiveDate;

use crate::record::Record;

// Start/end synonym chains used across every dated domain.
pub const START_KEYS: &[&str] = &["Started On", "Start Date"];
pub const END_KEYS: &[&str] = &["Finished On", "End Date"];

const MONTHS: &[&str] = &[
    "Jan", "Feb", "Mar", "Apr", "May", "Jun",
    "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Display range from a record's start/end fields:
/// "Jan 2020 – Mar 2022", "Jan 2020 – Present", or "".
pub fn date_range(record: &Record) -> String {
    let start = record.first_field(START_KEYS);
    let end = record.first_field(END_KEYS);
    match (start.is_empty(), end.is_empty()) {
        (false, false) => format!("{start} – {end}"),
        (false, true) => format!("{start} – Present"),
        _ => String::new(),
    }
}

/// Parse the export's date text: "<AbbrevMonth> <yyyy>" (month matched
/// case-insensitively) or a bare 4-digit year. Anything else is None.
pub fn year_month(text: &str) -> Option<(i32, Option<u32>)> {
    let trimmed = text.trim();

    if trimmed.len() == 4 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Some((trimmed.parse().ok()?, None));
    }

    let mut parts = trimmed.split_whitespace();
    let (month_txt, year_txt) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let month = MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(month_txt))? as u32
        + 1;
    if year_txt.len() != 4 || !year_txt.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((year_txt.parse().ok()?, Some(month)))
}

/// Canonical YYYY-MM-DD with the day pinned to 01. Unparseable text passes
/// through unchanged rather than failing.
pub fn iso_date(text: &str) -> String {
    match year_month(text) {
        Some((year, Some(month))) => format!("{year:04}-{month:02}-01"),
        Some((year, None)) => format!("{year:04}-01-01"),
        None => text.to_string(),
    }
}

/// Sort key for descending-by-date orderings. Unparseable dates map to the
/// minimum date so they sort last, never raise.
pub fn sort_key(text: &str) -> NaiveDate {
    year_month(text)
        .and_then(|(year, month)| NaiveDate::from_ymd_opt(year, month.unwrap_or(1), 1))
        .unwrap_or(NaiveDate::MIN)
}

// ── Tests ──
