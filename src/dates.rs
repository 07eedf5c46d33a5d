use chrono::NaiveDate;

/// Parse a `YYYY-MM-DD` date key. Returns `None` when parsing fails.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Compact `MM/DD` label for a date key, e.g. `2020-03-01` -> `03/01`.
///
/// Keys that are not ISO dates are returned unchanged.
pub fn short_label(value: &str) -> String {
    match parse_iso_date(value) {
        Some(date) => date.format("%m/%d").to_string(),
        None => value.to_string(),
    }
}
