use crate::config::ConfigError;
use crate::requirements::DecodeError;
use crate::telemetry::TelemetryError;
use crate::timeline::import::TimelineImportError;
use crate::wizard::WizardServiceError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Decode(DecodeError),
    Import(TimelineImportError),
    Wizard(WizardServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "invalid JSON: {}", err),
            AppError::Decode(err) => write!(f, "invalid requirements key: {}", err),
            AppError::Import(err) => write!(f, "timeline import failed: {}", err),
            AppError::Wizard(err) => write!(f, "wizard error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Decode(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Wizard(err) => Some(err),
        }
    }
}

impl AppError {
    /// Process exit code: 2 for bad input, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Decode(_) | AppError::Import(_) | AppError::Json(_) => 2,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Wizard(_) => 1,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<DecodeError> for AppError {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

impl From<TimelineImportError> for AppError {
    fn from(value: TimelineImportError) -> Self {
        Self::Import(value)
    }
}

impl From<WizardServiceError> for AppError {
    fn from(value: WizardServiceError) -> Self {
        Self::Wizard(value)
    }
}
