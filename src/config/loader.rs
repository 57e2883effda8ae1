//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Backend base URL override.
pub const ENV_BASE_URL: &str = "RAG_API_URL";
/// Per-attempt timeout override, in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "RAG_API_TIMEOUT_MS";
/// Attempt budget override for query/extract.
pub const ENV_MAX_ATTEMPTS: &str = "RAG_MAX_ATTEMPTS";
/// Listener bind address override.
pub const ENV_BIND_ADDRESS: &str = "GATEWAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// An environment override that was present but could not be used.
///
/// Overrides are applied before the log subscriber exists, so these are
/// handed back to the caller to report once logging is up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ignoring unparseable override {var}={value:?}")]
pub struct OverrideWarning {
    pub var: &'static str,
    pub value: String,
}

/// Resolve the effective configuration: file (if any), then process
/// environment overrides, then validation.
pub fn load(path: Option<&Path>) -> Result<(GatewayConfig, Vec<OverrideWarning>), ConfigError> {
    load_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load`] with `lookup` standing in for the process environment.
pub fn load_with<F>(
    path: Option<&Path>,
    lookup: F,
) -> Result<(GatewayConfig, Vec<OverrideWarning>), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => GatewayConfig::default(),
    };

    let warnings = apply_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok((config, warnings))
}

fn parse_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment-style overrides using `lookup` as the variable source.
///
/// Numeric values that fail to parse are skipped, the previous value is
/// kept, and a warning is returned for each.
pub fn apply_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Vec<OverrideWarning>
where
    F: Fn(&str) -> Option<String>,
{
    let mut warnings = Vec::new();

    if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
        config.backend.base_url = url.trim().to_string();
    }

    if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
        match raw.trim().parse() {
            Ok(ms) => config.backend.timeout_ms = ms,
            Err(_) => warnings.push(OverrideWarning {
                var: ENV_TIMEOUT_MS,
                value: raw,
            }),
        }
    }

    if let Some(raw) = lookup(ENV_MAX_ATTEMPTS) {
        match raw.trim().parse() {
            Ok(n) => config.retries.max_attempts = n,
            Err(_) => warnings.push(OverrideWarning {
                var: ENV_MAX_ATTEMPTS,
                value: raw,
            }),
        }
    }

    if let Some(addr) = lookup(ENV_BIND_ADDRESS).filter(|v| !v.trim().is_empty()) {
        config.listener.bind_address = addr.trim().to_string();
    }

    warnings
}
