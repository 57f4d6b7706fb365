//! Configuration loader
//!
//! Loads [`ClientConfig`] from environment variables and/or a file.
//!
//! ## Loading Strategy
//! 1. Variables from a `.env` file in the working directory are added to the
//!    process environment (existing variables win)
//! 2. A config file found by [`probe_config_paths`] provides the base values;
//!    without one the defaults are used
//! 3. `PARLEY_*` environment variables override individual fields
//! 4. The result is validated
//!
//! ## Environment Variables
//! - `PARLEY_BASE_URL`: Base endpoint address
//! - `PARLEY_SUBJECT`: Identity sent to the token endpoint
//! - `PARLEY_TIMEOUT_MS`: Per-attempt chat deadline in milliseconds
//! - `PARLEY_MAX_ATTEMPTS`: Attempts per chat call and per refresh
//! - `PARLEY_RETRY_DELAY_MS`: Base backoff delay in milliseconds
//! - `PARLEY_SAFETY_BUFFER_MS`: Credential expiry lead time in milliseconds
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./parley.json` or `./parley.toml`
//! 2. `./config.json` or `./config.toml`

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use parley_domain::{ClientConfig, ParleyError, Result};

pub const ENV_BASE_URL: &str = "PARLEY_BASE_URL";
pub const ENV_SUBJECT: &str = "PARLEY_SUBJECT";
pub const ENV_TIMEOUT_MS: &str = "PARLEY_TIMEOUT_MS";
pub const ENV_MAX_ATTEMPTS: &str = "PARLEY_MAX_ATTEMPTS";
pub const ENV_RETRY_DELAY_MS: &str = "PARLEY_RETRY_DELAY_MS";
pub const ENV_SAFETY_BUFFER_MS: &str = "PARLEY_SAFETY_BUFFER_MS";

/// Load configuration from the first config file found (if any) with
/// environment overrides applied on top.
///
/// # Errors
/// Returns `ParleyError::Config` if:
/// - A probed config file cannot be read or parsed
/// - An environment variable holds an invalid value
/// - The merged configuration fails validation
pub fn load() -> Result<ClientConfig> {
    load_dotenv();

    let base = match probe_config_paths() {
        Some(path) => read_config_file(&path)?,
        None => {
            tracing::debug!("No config file found, starting from defaults");
            ClientConfig::default()
        }
    };

    let config = apply_env_overrides(base)?;
    config.validate()?;
    tracing::info!(base_url = %config.base_url, subject = %config.subject, "Configuration loaded");
    Ok(config)
}

/// Load configuration from defaults plus environment variables only.
///
/// # Errors
/// Returns `ParleyError::Config` if a variable holds an invalid value or
/// the result fails validation.
pub fn load_from_env() -> Result<ClientConfig> {
    load_dotenv();

    let config = apply_env_overrides(ClientConfig::default())?;
    config.validate()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Supports JSON and
/// TOML (detected by file extension). Missing fields take their defaults.
/// Environment variables are not consulted.
///
/// # Errors
/// Returns `ParleyError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or unsupported
/// - The configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ParleyError::config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ParleyError::config("No config file found in any of the standard locations")
        })?,
    };

    let config = read_config_file(&config_path)?;
    config.validate()?;
    Ok(config)
}

/// Probe the working directory for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;

    ["parley.json", "parley.toml", "config.json", "config.toml"]
        .into_iter()
        .map(|name| cwd.join(name))
        .find(|path| path.is_file())
}

fn read_config_file(path: &Path) -> Result<ClientConfig> {
    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| ParleyError::config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ParleyError::config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ParleyError::config(format!("Invalid JSON format: {e}"))),
        _ => Err(ParleyError::config(format!("Unsupported config format: {extension}"))),
    }
}

fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }
}

/// Overlay every `PARLEY_*` variable that is set onto `config`.
fn apply_env_overrides(mut config: ClientConfig) -> Result<ClientConfig> {
    if let Some(base_url) = env_var(ENV_BASE_URL) {
        config.base_url = base_url;
    }
    if let Some(subject) = env_var(ENV_SUBJECT) {
        config.subject = subject;
    }
    if let Some(ms) = env_number::<u64>(ENV_TIMEOUT_MS)? {
        config.request_timeout = Duration::from_millis(ms);
    }
    if let Some(attempts) = env_number::<u32>(ENV_MAX_ATTEMPTS)? {
        config.max_attempts = attempts;
    }
    if let Some(ms) = env_number::<u64>(ENV_RETRY_DELAY_MS)? {
        config.retry_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = env_number::<u64>(ENV_SAFETY_BUFFER_MS)? {
        config.safety_buffer = Duration::from_millis(ms);
    }
    Ok(config)
}

/// Non-blank value of an environment variable.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_number<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ParleyError::config(format!("Invalid value for {key} ('{raw}'): {e}")))
        })
        .transpose()
}
