//! Date-ranged history entries and the continuous-coverage check applied to them.

mod coverage;
pub mod import;
mod merge;

pub use coverage::{validate_coverage, CoverageReport};
pub use merge::merge_ranges;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Inclusive calendar range with no "is current" ambiguity left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn years(&self) -> f64 {
        (self.end - self.start).num_days() as f64 / DAYS_PER_YEAR
    }
}

pub(crate) const DAYS_PER_YEAR: f64 = 365.25;

/// One user-supplied history entry as it arrives from the form.
///
/// Dates stay as raw strings so that unparseable input surfaces as a timeline
/// format error instead of a deserialization failure. Domain fields (address,
/// employer, institution) ride along in `details` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimelineEntry {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_current: bool,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl TimelineEntry {
    pub fn closed(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
            ..Self::default()
        }
    }

    pub fn current(start: NaiveDate) -> Self {
        Self {
            start_date: Some(start.to_string()),
            is_current: true,
            ..Self::default()
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Resolve to a concrete range, treating a current entry as ending `today`.
    ///
    /// Ranges ending after `today` are clamped to `today`.
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange, EntryProblem> {
        let start = match self.start_date.as_deref() {
            None => return Err(EntryProblem::MissingStartDate),
            Some(raw) => {
                parse_entry_date(raw).ok_or_else(|| EntryProblem::InvalidStartDate(raw.into()))?
            }
        };

        if start > today {
            return Err(EntryProblem::StartsInFuture);
        }

        let end = if self.is_current {
            today
        } else {
            match self.end_date.as_deref() {
                None => return Err(EntryProblem::MissingEndDate),
                Some(raw) => {
                    parse_entry_date(raw).ok_or_else(|| EntryProblem::InvalidEndDate(raw.into()))?
                }
            }
        };

        if end < start {
            return Err(EntryProblem::EndBeforeStart);
        }

        Ok(DateRange::new(start, end.min(today)))
    }
}

/// Why a single entry could not be turned into a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryProblem {
    MissingStartDate,
    InvalidStartDate(String),
    MissingEndDate,
    InvalidEndDate(String),
    EndBeforeStart,
    StartsInFuture,
}

impl fmt::Display for EntryProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryProblem::MissingStartDate => write!(f, "start date is missing"),
            EntryProblem::InvalidStartDate(raw) => write!(f, "start date '{raw}' is not a date"),
            EntryProblem::MissingEndDate => {
                write!(f, "end date is missing and the entry is not current")
            }
            EntryProblem::InvalidEndDate(raw) => write!(f, "end date '{raw}' is not a date"),
            EntryProblem::EndBeforeStart => write!(f, "end date is before start date"),
            EntryProblem::StartsInFuture => write!(f, "start date is in the future"),
        }
    }
}

/// Entry position (0-based) paired with its problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryIssue {
    pub index: usize,
    pub problem: EntryProblem,
}

impl fmt::Display for EntryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry {}: {}", self.index + 1, self.problem)
    }
}

/// The single coverage violation reported for a timeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    #[error("invalid timeline dates ({})", join_issues(.issues))]
    Format { issues: Vec<EntryIssue> },
    #[error("gap between {last_end} and today")]
    EndGap { last_end: NaiveDate },
    #[error("timeline is missing ~{missing_years:.1} years of the required {required_years} years")]
    InsufficientSpan {
        missing_years: f64,
        required_years: u32,
    },
    #[error("gap between {gap_start} and {gap_end}")]
    InternalGap {
        gap_start: NaiveDate,
        gap_end: NaiveDate,
    },
}

impl TimelineError {
    pub fn is_format(&self) -> bool {
        matches!(self, TimelineError::Format { .. })
    }

    pub fn is_gap(&self) -> bool {
        !self.is_format()
    }
}

fn join_issues(issues: &[EntryIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (truncated to its date).
pub fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    truthy(&value).ok_or_else(|| serde::de::Error::custom(format!("'{value}' is not a boolean")))
}

/// Interpret checkbox-style form values; `None` when the value is not boolean-like.
pub(crate) fn truthy(value: &Value) -> Option<bool> {
    match value {
        Value::Null => Some(false),
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_i64().map(|n| n != 0),
        Value::String(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Some(true),
            "false" | "0" | "off" | "no" | "" => Some(false),
            _ => None,
        },
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn entry_deserializes_form_values_leniently() {
        let entry: TimelineEntry = serde_json::from_value(json!({
            "start_date": "2020-03-01",
            "end_date": "",
            "is_current": "on",
            "street": "12 Elm St"
        }))
        .expect("entry deserializes");

        assert_eq!(entry.start_date.as_deref(), Some("2020-03-01"));
        assert_eq!(entry.end_date, None);
        assert!(entry.is_current);
        assert_eq!(entry.details.get("street"), Some(&json!("12 Elm St")));
    }

    #[test]
    fn current_entry_ignores_end_date() {
        let today = date(2024, 6, 1);
        let entry = TimelineEntry {
            end_date: Some("2019-01-01".to_string()),
            ..TimelineEntry::current(date(2020, 1, 1))
        };

        let range = entry.resolve(today).expect("resolves");
        assert_eq!(range, DateRange::new(date(2020, 1, 1), today));
    }

    #[test]
    fn resolve_reports_each_problem_kind() {
        let today = date(2024, 6, 1);

        let missing = TimelineEntry::default();
        assert_eq!(missing.resolve(today), Err(EntryProblem::MissingStartDate));

        let open = TimelineEntry {
            start_date: Some("2020-01-01".to_string()),
            ..TimelineEntry::default()
        };
        assert_eq!(open.resolve(today), Err(EntryProblem::MissingEndDate));

        let garbage = TimelineEntry {
            start_date: Some("last spring".to_string()),
            ..TimelineEntry::default()
        };
        assert_eq!(
            garbage.resolve(today),
            Err(EntryProblem::InvalidStartDate("last spring".to_string()))
        );

        let inverted = TimelineEntry::closed(date(2021, 1, 1), date(2020, 1, 1));
        assert_eq!(inverted.resolve(today), Err(EntryProblem::EndBeforeStart));

        let future = TimelineEntry::current(date(2025, 1, 1));
        assert_eq!(future.resolve(today), Err(EntryProblem::StartsInFuture));
    }

    #[test]
    fn resolve_clamps_future_end_to_today() {
        let today = date(2024, 6, 1);
        let entry = TimelineEntry::closed(date(2023, 1, 1), date(2025, 1, 1));
        assert_eq!(
            entry.resolve(today).expect("resolves").end,
            today,
            "end dates past today are clamped"
        );
    }

    #[test]
    fn parses_rfc3339_timestamps() {
        assert_eq!(
            parse_entry_date("2021-04-05T10:00:00Z"),
            Some(date(2021, 4, 5))
        );
        assert_eq!(parse_entry_date("04/05/2021"), None);
    }
}
