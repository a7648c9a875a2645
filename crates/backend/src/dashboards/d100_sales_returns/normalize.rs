//! Value coercion rules shared by the CSV and SQLite sources.

use chrono::{Duration, NaiveDate};

use super::error::LoadError;

/// Strict numeric coercion. Empty or non-numeric values are errors, never zero.
pub fn parse_number(row: usize, column: &str, raw: &str) -> Result<f64, LoadError> {
    let value = raw.trim();
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(LoadError::InvalidNumber {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Day formats tried in order. Slash dates are month-first.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Parse a calendar date.
///
/// The day part may be followed by a time part (`' '` or `'T'` separated),
/// which is ignored.
pub fn parse_date(row: usize, raw: &str) -> Result<NaiveDate, LoadError> {
    let day_part = raw
        .trim()
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or("");

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day_part, fmt).ok())
        .ok_or_else(|| LoadError::InvalidDate {
            row,
            value: raw.to_string(),
        })
}

/// Strict coercion for amounts that cannot go below zero (units, prices)
pub fn parse_non_negative(row: usize, column: &str, raw: &str) -> Result<f64, LoadError> {
    let n = parse_number(row, column, raw)?;
    non_negative(row, column, n)
}

pub fn non_negative(row: usize, column: &str, n: f64) -> Result<f64, LoadError> {
    if n < 0.0 {
        return Err(LoadError::InvalidNumber {
            row,
            column: column.to_string(),
            value: n.to_string(),
        });
    }
    Ok(n)
}

/// Coerce a returned flag to 0/1
pub fn parse_returned(row: usize, raw: &str) -> Result<u8, LoadError> {
    let value = raw.trim();
    match value.to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" => return Ok(0),
        "1" | "true" | "yes" => return Ok(1),
        _ => {}
    }
    match value.parse::<f64>() {
        Ok(n) if n == 0.0 => Ok(0),
        Ok(n) if n == 1.0 => Ok(1),
        _ => Err(LoadError::InvalidReturnedFlag {
            row,
            value: raw.to_string(),
        }),
    }
}

/// Placeholder dates for sources without a date column: `count` consecutive
/// days ending on `today`, oldest first.
pub fn synthesize_dates(count: usize, today: NaiveDate) -> Vec<NaiveDate> {
    (0..count)
        .map(|i| today - Duration::days((count - 1 - i) as i64))
        .collect()
}
