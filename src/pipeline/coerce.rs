//! Numeric and date coercion of loosely typed cells
//!
//! The numeric view is a transient `Vec<Option<f64>>` computed from a column.
//! It is never written back unless an operation explicitly assigns it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::dataset::Cell;

/// Characters treated as digit-group separators and removed before parsing
const THOUSANDS_SEPARATORS: [char; 5] = [',', '\'', '_', '\u{00A0}', '\u{202F}'];

/// Datetime layouts tried in order after RFC 3339
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only layouts tried in order
const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
];

/// Parse free text as a number, tolerating thousands separators
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !THOUSANDS_SEPARATORS.contains(c))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric reading of a single cell
pub fn to_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Null | Cell::DateTime(_) => None,
        Cell::Number(f) => Some(*f).filter(|v| v.is_finite()),
        Cell::Int(i) => Some(*i as f64),
        Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Cell::Text(s) => parse_number(s),
    }
}

/// Nullable numeric view of a column
pub fn numeric_view(cells: &[Cell]) -> Vec<Option<f64>> {
    cells.iter().map(to_number).collect()
}

/// Parse free text as a datetime; date-only inputs land on midnight
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Datetime reading of a single cell. Numbers are not interpreted as timestamps.
pub fn to_datetime(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Text(s) => parse_datetime(s),
        _ => None,
    }
}

/// Non-null values of a view
fn present(view: &[Option<f64>]) -> Vec<f64> {
    view.iter().flatten().copied().collect()
}

fn sorted_present(view: &[Option<f64>]) -> Vec<f64> {
    let mut values = present(view);
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values
}

/// Arithmetic mean of the non-null values
pub fn mean(view: &[Option<f64>]) -> Option<f64> {
    let values = present(view);
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Quantile with linear interpolation between closest ranks
pub fn quantile(view: &[Option<f64>], q: f64) -> Option<f64> {
    let values = sorted_present(view);
    if values.is_empty() {
        return None;
    }
    let pos = (values.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(values[lower] + (values[upper] - values[lower]) * frac)
}

pub fn median(view: &[Option<f64>]) -> Option<f64> {
    quantile(view, 0.5)
}

/// Sample standard deviation (n - 1); undefined below two values
pub fn sample_std(view: &[Option<f64>]) -> Option<f64> {
    let values = present(view);
    if values.len() < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

pub fn min(view: &[Option<f64>]) -> Option<f64> {
    present(view).into_iter().reduce(f64::min)
}

pub fn max(view: &[Option<f64>]) -> Option<f64> {
    present(view).into_iter().reduce(f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_number_strips_separators() {
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number(" 12 "), Some(12.0));
        assert_eq!(parse_number("1'000"), Some(1000.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_numeric_view_of_mixed_cells() {
        let cells = vec![
            Cell::Int(3),
            Cell::Text("2,000".into()),
            Cell::Null,
            Cell::Text("n/a".into()),
            Cell::Bool(true),
            Cell::Number(f64::NAN),
        ];
        assert_eq!(
            numeric_view(&cells),
            vec![Some(3.0), Some(2000.0), None, None, Some(1.0), None]
        );
    }

    #[test]
    fn test_statistics() {
        let view = vec![Some(1.0), None, Some(2.0), Some(3.0), Some(4.0)];
        assert_eq!(mean(&view), Some(2.5));
        assert_eq!(median(&view), Some(2.5));
        assert_eq!(quantile(&view, 0.25), Some(1.75));
        assert_eq!(quantile(&view, 0.75), Some(3.25));
        assert_eq!(min(&view), Some(1.0));
        assert_eq!(max(&view), Some(4.0));
        let std = sample_std(&view).unwrap();
        assert!((std - 1.2909944487).abs() < 1e-9);
    }

    #[test]
    fn test_statistics_of_empty_view() {
        let view: Vec<Option<f64>> = vec![None, None];
        assert_eq!(mean(&view), None);
        assert_eq!(median(&view), None);
        assert_eq!(sample_std(&[Some(1.0)]), None);
    }

    #[test]
    fn test_parse_datetime_formats() {
        let dt = parse_datetime("2023-07-14").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 7, 14));
        let dt = parse_datetime("2023-07-14 08:30:00").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "08:30");
        let dt = parse_datetime("07/14/2023").unwrap();
        assert_eq!(dt.month(), 7);
        assert!(parse_datetime("2023-07-14T08:30:00Z").is_some());
        assert!(parse_datetime("March 5, 2021").is_some());
        assert!(parse_datetime("not a date").is_none());
        assert!(parse_datetime("2023-13-45").is_none());
    }

    #[test]
    fn test_parse_datetime_keeps_offset_wall_clock() {
        let dt = parse_datetime("2024-01-01T02:00:00+05:00").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 1));
        assert_eq!(dt.format("%H:%M").to_string(), "02:00");
    }
}
