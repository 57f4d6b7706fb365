//! Tracing subscriber setup

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use crate::errors::InfraError;

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = InfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(InfraError::config(format!("unknown log format: {other}"))),
        }
    }
}

/// Install a global `fmt` subscriber.
///
/// The filter comes from `RUST_LOG` when set, otherwise from
/// `default_filter` (e.g. `"info,parley_core=debug"`).
///
/// # Errors
///
/// Returns [`InfraError::Config`] if `default_filter` is not a valid filter
/// directive or a global subscriber is already installed.
pub fn init_tracing(default_filter: &str, format: LogFormat) -> Result<(), InfraError> {
    let filter = build_filter(default_filter)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| InfraError::config(format!("failed to install tracing subscriber: {e}")))
}

fn build_filter(default_filter: &str) -> Result<EnvFilter, InfraError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| InfraError::config(format!("invalid log filter '{default_filter}': {e}"))),
    }
}
