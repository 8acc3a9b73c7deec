use chrono::NaiveDate;
use intake_wizard::config::{AppConfig, WizardConfig};
use intake_wizard::error::AppError;
use serde::Serialize;

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Wizard settings with a command-line `--today` taking precedence over the environment.
pub(crate) fn wizard_config(config: &AppConfig, today: Option<NaiveDate>) -> WizardConfig {
    WizardConfig {
        reference_date: today.or(config.wizard.reference_date),
        ..config.wizard
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
