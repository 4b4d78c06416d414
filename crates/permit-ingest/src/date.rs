//! Period token parsing.
//!
//! Every period is normalized to the first day of its month.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use permit_model::first_of_month;

/// Year and month with an optional day, separated by `-`, `.` or `/`, or
/// packed as `YYYYMM`. A trailing unit label (`월`, `M`) is ignored.
static AUTO_PERIOD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(?:[-./](\d{1,2})|(\d{2}))(?:[-./](\d{1,2}))?\s*[^\d\s]*$")
        .expect("Invalid period regex")
});

/// Rule for turning a period cell into a date.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateFormat {
    /// ISO dates and the common year-month layouts.
    #[default]
    Auto,
    /// An explicit `chrono` format such as `%Y.%m 월`; the day defaults to 1.
    Pattern { format: String },
}

/// Parses a period cell according to `format`.
pub fn parse_period(value: &str, format: &DateFormat) -> Option<NaiveDate> {
    let value = value.trim();
    let date = match format {
        DateFormat::Auto => parse_auto(value)?,
        DateFormat::Pattern { format } => parse_pattern(value, format)?,
    };
    first_of_month(date.year(), date.month())
}

fn parse_auto(value: &str) -> Option<NaiveDate> {
    let captures = AUTO_PERIOD_REGEX.captures(value)?;
    let year: i32 = captures.get(1)?.as_str().parse().ok()?;
    let month: u32 = captures
        .get(2)
        .or_else(|| captures.get(3))?
        .as_str()
        .parse()
        .ok()?;
    let day: u32 = match captures.get(4) {
        Some(day) => day.as_str().parse().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_pattern(value: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, format)
        .or_else(|_| NaiveDate::parse_from_str(&format!("{value} 1"), &format!("{format} %d")))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> NaiveDate {
        first_of_month(year, month).unwrap()
    }

    #[test]
    fn test_auto_layouts() {
        for token in [
            "2001-03",
            "2001-03-31",
            "2001.03",
            "2001.3",
            "2001/03",
            "200103",
            "2001.03 월",
            "2001.03월",
        ] {
            assert_eq!(
                parse_period(token, &DateFormat::Auto),
                Some(ym(2001, 3)),
                "{token}"
            );
        }
    }

    #[test]
    fn test_auto_rejects_garbage() {
        assert_eq!(parse_period("합계", &DateFormat::Auto), None);
        assert_eq!(parse_period("2001.13", &DateFormat::Auto), None);
        assert_eq!(parse_period("", &DateFormat::Auto), None);
    }

    #[test]
    fn test_pattern_with_unit_label() {
        let format = DateFormat::Pattern {
            format: "%Y.%m 월".to_string(),
        };
        assert_eq!(parse_period("2011.01 월", &format), Some(ym(2011, 1)));
        assert_eq!(parse_period("2011-01", &format), None);
    }

    #[test]
    fn test_pattern_with_day() {
        let format = DateFormat::Pattern {
            format: "%d/%m/%Y".to_string(),
        };
        assert_eq!(parse_period("15/06/2020", &format), Some(ym(2020, 6)));
    }
}
