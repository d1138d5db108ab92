use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{FitError, Result};

pub const DATE_FMT: &str = "%Y-%m-%d";

/// Accepts `YYYY-MM-DD` as well as `DD-MM-YYYY`.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DATE_FMT)
        .or_else(|_| NaiveDate::parse_from_str(s, "%d-%m-%Y"))
        .map_err(|_| FitError::validation(format!("invalid date `{s}` (expected YYYY-MM-DD)")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

pub fn format_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours == 0 {
        format!("{}min", rest)
    } else {
        format!("{}h{:02}", hours, rest)
    }
}

/// Fixed-width text progress bar, e.g. `[#####-----]`.
pub fn progress_bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date("2024-03-09").unwrap(), expected);
        assert_eq!(parse_date("09-03-2024").unwrap(), expected);
        assert!(parse_date("March 9th").is_err());
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(45), "45min");
        assert_eq!(format_minutes(125), "2h05");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(50.0, 10), "[#####-----]");
        assert_eq!(progress_bar(150.0, 4), "[####]");
        assert_eq!(progress_bar(0.0, 3), "[---]");
    }
}
