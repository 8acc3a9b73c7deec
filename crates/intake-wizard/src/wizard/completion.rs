use super::catalog::{
    AccumulatorStepConfig, CompletionRule, CoverageRule, ResolvedStepConfig, SimpleStepConfig,
};
use super::domain::{FieldErrors, StepState, StepValues};
use super::fields::{required_fields_present, validate_fields};
use crate::timeline::{validate_coverage, TimelineEntry};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

pub const ENTRIES_KEY: &str = "entries";
pub const TIMELINE_ERROR_KEY: &str = "timeline";

/// Field-level checks every step supports.
pub trait Validatable {
    fn validate(&self, values: &StepValues, today: NaiveDate) -> FieldErrors;
    fn required_fields_present(&self, values: &StepValues) -> bool;
}

/// Steps that collect a growable list of dated entries.
pub trait AccumulatorLike {
    /// Coverage and entry-count rule in force for the current values.
    fn coverage_rule(&self, values: &StepValues) -> CoverageRule;
    fn completion_met(&self, values: &StepValues, entry_count: usize) -> bool;
}

impl Validatable for SimpleStepConfig {
    fn validate(&self, values: &StepValues, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();
        validate_fields(&self.fields, values, "", today, &mut errors);
        errors
    }

    fn required_fields_present(&self, values: &StepValues) -> bool {
        required_fields_present(&self.fields, values)
    }
}

impl Validatable for AccumulatorStepConfig {
    fn validate(&self, values: &StepValues, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();
        validate_fields(&self.step_fields, values, "", today, &mut errors);

        let items = match values.get(ENTRIES_KEY) {
            None | Some(Value::Null) => return errors,
            Some(Value::Array(items)) => items,
            Some(_) => {
                errors.insert(ENTRIES_KEY.to_string(), "entries must be a list".to_string());
                return errors;
            }
        };

        for (index, item) in items.iter().enumerate() {
            match item {
                Value::Object(entry) => {
                    let prefix = format!("{ENTRIES_KEY}[{index}].");
                    validate_fields(&self.entry_fields, entry, &prefix, today, &mut errors);
                }
                _ => {
                    errors.insert(
                        format!("{ENTRIES_KEY}[{index}]"),
                        "entry must be an object".to_string(),
                    );
                }
            }
        }

        errors
    }

    fn required_fields_present(&self, values: &StepValues) -> bool {
        required_fields_present(&self.step_fields, values)
    }
}

impl AccumulatorLike for AccumulatorStepConfig {
    fn coverage_rule(&self, values: &StepValues) -> CoverageRule {
        match self.completion {
            CompletionRule::Entries | CompletionRule::DistinctEntries { .. } => self.coverage,
            CompletionRule::EducationLevel {
                level_field,
                exempt_level,
            } => {
                let exempt = values
                    .get(level_field)
                    .and_then(Value::as_str)
                    .map(|level| level.trim() == exempt_level)
                    .unwrap_or(false);
                if exempt {
                    CoverageRule {
                        required_entries: 0,
                        ..self.coverage
                    }
                } else {
                    self.coverage
                }
            }
        }
    }

    fn completion_met(&self, values: &StepValues, entry_count: usize) -> bool {
        let rule = self.coverage_rule(values);
        if rule.required_entries == 0 {
            return true;
        }
        let counted = match self.completion {
            CompletionRule::DistinctEntries { key_field } => distinct_entries(values, key_field),
            CompletionRule::Entries | CompletionRule::EducationLevel { .. } => entry_count,
        };
        counted >= rule.required_entries as usize
    }
}

/// Entries with distinct, non-blank `key_field` values, compared case-insensitively.
fn distinct_entries(values: &StepValues, key_field: &str) -> usize {
    let Some(Value::Array(items)) = values.get(ENTRIES_KEY) else {
        return 0;
    };
    items
        .iter()
        .filter_map(|item| item.get(key_field).and_then(Value::as_str))
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .len()
}

impl Validatable for ResolvedStepConfig {
    fn validate(&self, values: &StepValues, today: NaiveDate) -> FieldErrors {
        match self {
            ResolvedStepConfig::Simple(config) => config.validate(values, today),
            ResolvedStepConfig::Accumulator(config) => config.validate(values, today),
        }
    }

    fn required_fields_present(&self, values: &StepValues) -> bool {
        match self {
            ResolvedStepConfig::Simple(config) => config.required_fields_present(values),
            ResolvedStepConfig::Accumulator(config) => config.required_fields_present(values),
        }
    }
}

/// Entries parsed from the step values; malformed items become field errors.
fn parse_entries(values: &StepValues, errors: &mut FieldErrors) -> Vec<TimelineEntry> {
    let Some(Value::Array(items)) = values.get(ENTRIES_KEY) else {
        return Vec::new();
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if !item.is_object() {
            continue;
        }
        match serde_json::from_value::<TimelineEntry>(item.clone()) {
            Ok(entry) => entries.push(entry),
            Err(err) => {
                errors.insert(
                    format!("{ENTRIES_KEY}[{index}]"),
                    format!("entry is malformed: {err}"),
                );
            }
        }
    }
    entries
}

/// Fold `incoming` into the step's values and recompute validity and completion.
///
/// List-valued fields such as `entries` are replaced wholesale. The returned
/// state is a fresh snapshot; persisting it is the caller's job.
pub fn complete_step(
    config: &ResolvedStepConfig,
    existing: &StepState,
    incoming: StepValues,
    today: NaiveDate,
) -> StepState {
    let mut values = existing.values.clone();
    values.extend(incoming);

    let mut errors = config.validate(&values, today);
    let required_present = config.required_fields_present(&values);

    let (completion_met, total_years) = match config.as_accumulator() {
        None => (true, None),
        Some(accumulator) => {
            let item_count = match values.get(ENTRIES_KEY) {
                Some(Value::Array(items)) => items.len(),
                _ => 0,
            };
            let entries = parse_entries(&values, &mut errors);
            let rule = accumulator.coverage_rule(&values);

            let mut total_years = None;
            if !entries.is_empty() && entries.len() == item_count {
                let report = validate_coverage(&entries, rule.required_years, today);
                total_years = Some(report.total_years);
                if let Some(err) = report.error {
                    errors.insert(TIMELINE_ERROR_KEY.to_string(), err.to_string());
                }
            }

            (
                accumulator.completion_met(&values, entries.len()),
                total_years,
            )
        }
    };

    let is_valid = errors.is_empty();
    let is_complete = is_valid && required_present && completion_met;

    debug!(
        step = %config.kind(),
        is_valid,
        is_complete,
        error_count = errors.len(),
        "step completion evaluated"
    );

    StepState {
        values,
        errors,
        is_valid,
        is_complete,
        total_years,
    }
}
