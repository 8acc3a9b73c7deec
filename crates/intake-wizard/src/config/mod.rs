use crate::wizard::ProgressPolicy;
use chrono::{Local, NaiveDate};
use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub wizard: WizardConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let partial_credit = match env::var("INTAKE_PARTIAL_STEP_CREDIT") {
            Ok(raw) => parse_flag("INTAKE_PARTIAL_STEP_CREDIT", &raw)?,
            Err(_) => true,
        };

        let reference_date = match env::var("INTAKE_REFERENCE_DATE") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|source| {
                    ConfigError::InvalidDate {
                        name: "INTAKE_REFERENCE_DATE",
                        value: raw.clone(),
                        source,
                    }
                })?,
            ),
            _ => None,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            wizard: WizardConfig {
                progress: ProgressPolicy {
                    partial_credit_for_valid_current: partial_credit,
                },
                reference_date,
            },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Settings handed to the wizard core; fully resolved before any step runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WizardConfig {
    pub progress: ProgressPolicy,
    /// Fixed "today" for coverage checks; the local date when unset.
    pub reference_date: Option<NaiveDate>,
}

impl WizardConfig {
    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidFlag {
        name: &'static str,
        value: String,
    },
    InvalidDate {
        name: &'static str,
        value: String,
        source: chrono::ParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false (found '{value}')")
            }
            ConfigError::InvalidDate { name, value, .. } => {
                write!(f, "{name} must be a YYYY-MM-DD date (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidFlag { .. } => None,
            ConfigError::InvalidDate { source, .. } => Some(source),
        }
    }
}
