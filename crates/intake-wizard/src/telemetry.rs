use crate::config::TelemetryConfig;
use std::env;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

const RUST_LOG: &str = "RUST_LOG";

#[derive(Debug)]
pub enum TelemetryError {
    /// A log directive from `RUST_LOG` or `APP_LOG_LEVEL` did not parse.
    InvalidFilter {
        origin: &'static str,
        directive: String,
        source: ParseError,
    },
    AlreadyInitialized(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter {
                origin, directive, ..
            } => write!(f, "{origin} holds an unusable log directive '{directive}'"),
            TelemetryError::AlreadyInitialized(err) => {
                write!(f, "intake logging was already initialized: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidFilter { source, .. } => Some(source),
            TelemetryError::AlreadyInitialized(err) => Some(&**err),
        }
    }
}

/// A non-blank `RUST_LOG` replaces the configured level; a malformed one is an error.
fn build_filter(
    rust_log: Option<&str>,
    config: &TelemetryConfig,
) -> Result<EnvFilter, TelemetryError> {
    let (origin, directive) = match rust_log.map(str::trim) {
        Some(directive) if !directive.is_empty() => (RUST_LOG, directive),
        _ => ("APP_LOG_LEVEL", config.log_level.trim()),
    };

    EnvFilter::try_new(directive).map_err(|source| TelemetryError::InvalidFilter {
        origin,
        directive: directive.to_string(),
        source,
    })
}

/// Install the global subscriber. Logs go to stderr so command output stays machine-readable.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let rust_log = env::var(RUST_LOG).ok();
    let env_filter = build_filter(rust_log.as_deref(), config)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: &str) -> TelemetryConfig {
        TelemetryConfig {
            log_level: level.to_string(),
        }
    }

    #[test]
    fn configured_level_applies_without_rust_log() {
        assert!(build_filter(None, &config("intake_wizard=debug,info")).is_ok());
        assert!(build_filter(Some("  "), &config("warn")).is_ok());
    }

    #[test]
    fn malformed_directive_names_its_origin() {
        match build_filter(None, &config("intake_wizard=verbose")) {
            Err(TelemetryError::InvalidFilter {
                origin, directive, ..
            }) => {
                assert_eq!(origin, "APP_LOG_LEVEL");
                assert_eq!(directive, "intake_wizard=verbose");
            }
            other => panic!("expected invalid filter, got {other:?}"),
        }

        match build_filter(Some("intake_wizard=loud"), &config("info")) {
            Err(err @ TelemetryError::InvalidFilter { .. }) => {
                assert_eq!(
                    err.to_string(),
                    "RUST_LOG holds an unusable log directive 'intake_wizard=loud'"
                );
            }
            other => panic!("expected invalid filter, got {other:?}"),
        }
    }
}
