use std::cmp::Ordering;
use std::fmt::{self, Write};

use chrono::format::{Item, StrftimeItems};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};

const SECOND_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MILLIS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const PARSE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_ONLY_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// A point in time plus the precision it was produced with. Values without
/// millisecond precision are truncated to whole seconds on construction, so
/// equality and formatting both follow the flag.
#[derive(Debug, Clone, Copy)]
pub struct DateValue {
    at: NaiveDateTime,
    has_millis: bool,
}

impl DateValue {
    pub fn new(at: NaiveDateTime, has_millis: bool) -> Self {
        let nanos = if has_millis {
            at.nanosecond() / 1_000_000 * 1_000_000
        } else {
            0
        };
        Self {
            at: at.with_nanosecond(nanos).unwrap_or(at),
            has_millis,
        }
    }

    pub fn now(has_millis: bool) -> Self {
        Self::new(Local::now().naive_local(), has_millis)
    }

    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        for format in PARSE_FORMATS {
            if let Ok(at) = NaiveDateTime::parse_from_str(text, format) {
                return Some(Self::new(at, at.nanosecond() != 0));
            }
        }
        for format in DATE_ONLY_FORMATS {
            if let Ok(day) = NaiveDate::parse_from_str(text, format) {
                return day.and_hms_opt(0, 0, 0).map(|at| Self::new(at, false));
            }
        }
        None
    }

    pub fn at(&self) -> NaiveDateTime {
        self.at
    }

    pub fn has_millis(&self) -> bool {
        self.has_millis
    }

    pub fn epoch_seconds(&self) -> f64 {
        self.at.and_utc().timestamp_millis() as f64 / 1000.0
    }

    /// Formats with a strftime pattern; `None` when the pattern is invalid or
    /// needs data a naive timestamp lacks (`%z`, `%Z`).
    pub fn format(&self, pattern: &str) -> Option<String> {
        let items = StrftimeItems::new(pattern).collect::<Vec<_>>();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return None;
        }
        let mut out = String::new();
        write!(out, "{}", self.at.format_with_items(items.into_iter())).ok()?;
        Some(out)
    }

    pub fn checked_add(&self, delta: Duration) -> Option<Self> {
        self.at
            .checked_add_signed(delta)
            .map(|at| Self::new(at, self.has_millis))
    }
}

impl PartialEq for DateValue {
    fn eq(&self, other: &Self) -> bool {
        self.has_millis == other.has_millis && self.at == other.at
    }
}

impl PartialOrd for DateValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.at.cmp(&other.at))
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = if self.has_millis {
            MILLIS_FORMAT
        } else {
            SECOND_FORMAT
        };
        write!(f, "{}", self.at.format(format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_precision_drops_fraction() {
        let date = DateValue::parse("2024-03-05 10:11:12.345").expect("date should parse");
        assert!(date.has_millis());
        assert_eq!(date.to_string(), "2024-03-05 10:11:12.345");

        let coarse = DateValue::new(date.at(), false);
        assert_eq!(coarse.to_string(), "2024-03-05 10:11:12");
    }

    #[test]
    fn equality_is_precision_sensitive() {
        let fine = DateValue::parse("2024-03-05 10:11:12.000").expect("date should parse");
        let coarse = DateValue::parse("2024-03-05 10:11:12").expect("date should parse");
        let fine = DateValue::new(fine.at(), true);
        assert_eq!(fine.at(), coarse.at());
        assert_ne!(fine, coarse);
    }

    #[test]
    fn rejects_invalid_format_pattern() {
        let date = DateValue::parse("2024-01-02").expect("date should parse");
        assert_eq!(date.format("%Y/%m/%d").as_deref(), Some("2024/01/02"));
        assert_eq!(date.format("%Q"), None);
    }

    #[test]
    fn offset_specifiers_are_rejected() {
        let date = DateValue::parse("2024-01-02 03:04:05").expect("date should parse");
        assert_eq!(date.format("%z"), None);
        assert_eq!(date.format("%Y %:z"), None);
        assert_eq!(date.format("%Z"), None);
    }
}
