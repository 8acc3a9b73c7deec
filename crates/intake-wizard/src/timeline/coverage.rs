use super::{merge_ranges, DateRange, EntryIssue, TimelineEntry, TimelineError, DAYS_PER_YEAR};
use chrono::{Months, NaiveDate};
use serde::{Serialize, Serializer};
use tracing::debug;

/// Outcome of a coverage check: years covered plus at most one violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub total_years: f64,
    #[serde(serialize_with = "error_message")]
    pub error: Option<TimelineError>,
}

impl CoverageReport {
    pub fn is_covered(&self) -> bool {
        self.error.is_none()
    }

    fn failed(total_years: f64, error: TimelineError) -> Self {
        Self {
            total_years,
            error: Some(error),
        }
    }
}

fn error_message<S>(error: &Option<TimelineError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match error {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Check that `entries` cover the `required_years` ending at `today` without gaps.
///
/// `required_years == 0` only checks that every entry resolves to a valid
/// range. Violations are reported in priority order: format, end gap,
/// insufficient span, then the oldest internal gap.
pub fn validate_coverage(
    entries: &[TimelineEntry],
    required_years: u32,
    today: NaiveDate,
) -> CoverageReport {
    let mut ranges = Vec::with_capacity(entries.len());
    let mut issues = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        match entry.resolve(today) {
            Ok(range) => ranges.push(range),
            Err(problem) => issues.push(EntryIssue { index, problem }),
        }
    }

    if !issues.is_empty() {
        debug!(count = issues.len(), "timeline rejected for invalid dates");
        return CoverageReport::failed(0.0, TimelineError::Format { issues });
    }

    let merged = merge_ranges(ranges);
    let total_years = round_to(merged.iter().map(DateRange::years).sum(), 2);

    if required_years == 0 {
        return CoverageReport {
            total_years,
            error: None,
        };
    }

    let (first, last) = match (merged.first(), merged.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return CoverageReport::failed(
                total_years,
                TimelineError::InsufficientSpan {
                    missing_years: f64::from(required_years),
                    required_years,
                },
            )
        }
    };

    if last.end < today {
        return CoverageReport::failed(
            total_years,
            TimelineError::EndGap {
                last_end: last.end,
            },
        );
    }

    let window_start = today
        .checked_sub_months(Months::new(required_years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN);
    if first.start > window_start {
        let shortfall = (first.start - window_start).num_days() as f64 / DAYS_PER_YEAR;
        return CoverageReport::failed(
            total_years,
            TimelineError::InsufficientSpan {
                missing_years: round_to(shortfall, 1),
                required_years,
            },
        );
    }

    if let Some(pair) = merged.windows(2).find(|pair| pair[1].start > pair[0].end) {
        return CoverageReport::failed(
            total_years,
            TimelineError::InternalGap {
                gap_start: pair[0].end,
                gap_end: pair[1].start,
            },
        );
    }

    CoverageReport {
        total_years,
        error: None,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn zero_requirement_only_checks_format() {
        let today = date(2024, 6, 1);
        let entries = vec![TimelineEntry::closed(date(2001, 1, 1), date(2002, 1, 1))];

        let report = validate_coverage(&entries, 0, today);
        assert!(report.is_covered());
        assert_eq!(report.total_years, 1.0);
    }

    #[test]
    fn empty_timeline_misses_the_full_requirement() {
        let report = validate_coverage(&[], 3, date(2024, 6, 1));
        match report.error {
            Some(TimelineError::InsufficientSpan {
                missing_years,
                required_years,
            }) => {
                assert_eq!(missing_years, 3.0);
                assert_eq!(required_years, 3);
            }
            other => panic!("expected insufficient span, got {other:?}"),
        }
    }

    #[test]
    fn format_errors_name_every_offending_entry() {
        let today = date(2024, 6, 1);
        let entries = vec![
            TimelineEntry::closed(date(2019, 1, 1), date(2020, 1, 1)),
            TimelineEntry::closed(date(2021, 1, 1), date(2020, 6, 1)),
            TimelineEntry::default(),
        ];

        let report = validate_coverage(&entries, 5, today);
        let err = report.error.expect("format error");
        assert!(err.is_format());
        let message = err.to_string();
        assert!(message.contains("entry 2: end date is before start date"));
        assert!(message.contains("entry 3: start date is missing"));
        assert_eq!(report.total_years, 0.0);
    }

    #[test]
    fn end_gap_takes_priority_over_span() {
        let today = date(2024, 6, 1);
        let entries = vec![TimelineEntry::closed(date(2023, 1, 1), date(2024, 1, 1))];

        let report = validate_coverage(&entries, 5, today);
        assert_eq!(
            report.error,
            Some(TimelineError::EndGap {
                last_end: date(2024, 1, 1)
            })
        );
        assert_eq!(
            report.error.expect("error").to_string(),
            "gap between 2024-01-01 and today"
        );
    }

    #[test]
    fn first_internal_gap_is_reported_oldest_first() {
        let today = date(2024, 6, 1);
        let entries = vec![
            TimelineEntry::current(date(2022, 1, 1)),
            TimelineEntry::closed(date(2015, 1, 1), date(2017, 1, 1)),
            TimelineEntry::closed(date(2018, 1, 1), date(2021, 1, 1)),
        ];

        let report = validate_coverage(&entries, 5, today);
        assert_eq!(
            report.error,
            Some(TimelineError::InternalGap {
                gap_start: date(2017, 1, 1),
                gap_end: date(2018, 1, 1),
            })
        );
    }

    #[test]
    fn report_serializes_error_as_message() {
        let report = validate_coverage(&[], 1, date(2024, 6, 1));
        let json = serde_json::to_value(&report).expect("serializes");
        assert_eq!(
            json["error"],
            "timeline is missing ~1.0 years of the required 1 years"
        );

        let ok = validate_coverage(&[], 0, date(2024, 6, 1));
        let json = serde_json::to_value(&ok).expect("serializes");
        assert!(json["error"].is_null());
    }
}
