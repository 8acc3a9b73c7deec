use super::catalog::{FieldKind, FieldSpec, PatternKind, ValidationRule};
use super::domain::{FieldErrors, StepValues};
use crate::timeline::{parse_entry_date, truthy};
use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

impl PatternKind {
    fn regex(self) -> &'static Regex {
        static EMAIL: OnceLock<Regex> = OnceLock::new();
        static PHONE: OnceLock<Regex> = OnceLock::new();
        static POSTAL: OnceLock<Regex> = OnceLock::new();
        static LICENSE: OnceLock<Regex> = OnceLock::new();
        static REGION: OnceLock<Regex> = OnceLock::new();

        match self {
            PatternKind::Email => EMAIL.get_or_init(|| {
                Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("regex for email addresses")
            }),
            PatternKind::Phone => PHONE.get_or_init(|| {
                Regex::new(r"^\+?[0-9][0-9 ().-]{6,18}[0-9]$").expect("regex for phone numbers")
            }),
            PatternKind::PostalCode => POSTAL.get_or_init(|| {
                Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 -]{1,8}[A-Za-z0-9]$")
                    .expect("regex for postal codes")
            }),
            PatternKind::LicenseNumber => LICENSE.get_or_init(|| {
                Regex::new(r"^[A-Za-z0-9-]{4,20}$").expect("regex for license numbers")
            }),
            PatternKind::RegionCode => REGION.get_or_init(|| {
                Regex::new(r"^[A-Za-z][A-Za-z .'-]{1,59}$").expect("regex for region names")
            }),
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            PatternKind::Email => "a valid email address",
            PatternKind::Phone => "a valid phone number",
            PatternKind::PostalCode => "a valid postal code",
            PatternKind::LicenseNumber => "4-20 letters, digits, or hyphens",
            PatternKind::RegionCode => "a valid state or region",
        }
    }
}

/// Whether a submitted value counts as filled in.
pub(crate) fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// Validate `values` against `fields`, writing messages under `prefix + field id`.
pub(crate) fn validate_fields(
    fields: &[FieldSpec],
    values: &StepValues,
    prefix: &str,
    today: NaiveDate,
    errors: &mut FieldErrors,
) {
    for field in fields {
        if let Some(message) = validate_field(field, values.get(field.id), today) {
            errors.insert(format!("{prefix}{}", field.id), message);
        }
    }
}

pub(crate) fn required_fields_present(fields: &[FieldSpec], values: &StepValues) -> bool {
    fields
        .iter()
        .filter(|field| field.required)
        .all(|field| is_present(values.get(field.id)))
}

/// First violated rule for a single field, if any.
pub(crate) fn validate_field(
    field: &FieldSpec,
    value: Option<&Value>,
    today: NaiveDate,
) -> Option<String> {
    if !is_present(value) {
        return field
            .required
            .then(|| format!("{} is required", field.label));
    }
    let value = value?;

    if let Some(message) = check_kind(field, value) {
        return Some(message);
    }

    field
        .rules
        .iter()
        .find_map(|rule| check_rule(field, *rule, value, today))
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn check_kind(field: &FieldSpec, value: &Value) -> Option<String> {
    let label = field.label;
    match field.kind {
        FieldKind::Text => as_text(value)
            .is_none()
            .then(|| format!("{label} must be text")),
        FieldKind::Email => check_pattern(label, PatternKind::Email, value),
        FieldKind::Phone => check_pattern(label, PatternKind::Phone, value),
        FieldKind::Date => match value.as_str().and_then(parse_entry_date) {
            Some(_) => None,
            None => Some(format!("{label} must be a date (YYYY-MM-DD)")),
        },
        FieldKind::Boolean => truthy(value)
            .is_none()
            .then(|| format!("{label} must be yes or no")),
        FieldKind::Select(options) => match value.as_str().map(str::trim) {
            Some(choice) if options.contains(&choice) => None,
            _ => Some(format!("{label} must be one of: {}", options.join(", "))),
        },
        FieldKind::Number => as_number(value)
            .is_none()
            .then(|| format!("{label} must be a number")),
    }
}

fn check_pattern(label: &str, pattern: PatternKind, value: &Value) -> Option<String> {
    match as_text(value) {
        Some(text) if pattern.regex().is_match(&text) => None,
        _ => Some(format!("{label} must be {}", pattern.describe())),
    }
}

fn check_rule(
    field: &FieldSpec,
    rule: ValidationRule,
    value: &Value,
    today: NaiveDate,
) -> Option<String> {
    let label = field.label;
    match rule {
        ValidationRule::MinLength(min) => {
            let length = as_text(value).map(|text| text.chars().count()).unwrap_or(0);
            (length < min).then(|| format!("{label} must be at least {min} characters"))
        }
        ValidationRule::MaxLength(max) => {
            let length = as_text(value).map(|text| text.chars().count()).unwrap_or(0);
            (length > max).then(|| format!("{label} must be at most {max} characters"))
        }
        ValidationRule::Pattern(pattern) => check_pattern(label, pattern, value),
        ValidationRule::Range { min, max } => match as_number(value) {
            Some(number) if (min..=max).contains(&number) => None,
            _ => Some(format!("{label} must be between {min} and {max}")),
        },
        ValidationRule::MustBeTrue => {
            (truthy(value) != Some(true)).then(|| format!("{label} must be accepted"))
        }
        ValidationRule::NotInFuture => value
            .as_str()
            .and_then(parse_entry_date)
            .filter(|date| *date > today)
            .map(|_| format!("{label} cannot be in the future")),
        ValidationRule::NotInPast => value
            .as_str()
            .and_then(parse_entry_date)
            .filter(|date| *date < today)
            .map(|_| format!("{label} cannot be in the past")),
    }
}
