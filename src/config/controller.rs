//! Controller configuration.
//!
//! Values are parsed strictly: a ceiling must be a positive integer. Strings,
//! floats, negatives, zero and missing values are configuration errors rather
//! than being coerced into something that might admit work.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{
    AdmissionError, AppResult, Ceiling, ControllerLimits, ExecutionStatus, DEFAULT_MAX_PAGES,
    DEFAULT_PAGE_SIZE, DEFAULT_QUERY_TIMEOUT,
};

/// Environment variable holding the ceiling.
pub const ENV_CEILING: &str = "MAX_QUEUE_CAPACITY";
/// Environment variable holding the query timeout in milliseconds.
pub const ENV_QUERY_TIMEOUT_MS: &str = "ADMISSION_QUERY_TIMEOUT_MS";
/// Environment variable holding the page size.
pub const ENV_PAGE_SIZE: &str = "ADMISSION_PAGE_SIZE";
/// Environment variable holding the page budget.
pub const ENV_MAX_PAGES: &str = "ADMISSION_MAX_PAGES";
/// Environment variable holding a comma-separated list of counted statuses.
pub const ENV_COUNT_STATUSES: &str = "ADMISSION_COUNT_STATUSES";
/// Environment variable holding the ceiling refresh interval in seconds.
pub const ENV_CEILING_REFRESH_SECS: &str = "ADMISSION_CEILING_REFRESH_SECS";
/// Environment variable holding the controller name.
pub const ENV_CONTROLLER_NAME: &str = "ADMISSION_CONTROLLER_NAME";

fn default_name() -> String {
    "default".into()
}

#[allow(clippy::cast_possible_truncation)]
const fn default_query_timeout_ms() -> u64 {
    DEFAULT_QUERY_TIMEOUT.as_millis() as u64
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

const fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_count_statuses() -> Vec<ExecutionStatus> {
    vec![ExecutionStatus::Running]
}

/// Admission controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    /// Controller name used in logs and audit events.
    #[serde(default = "default_name")]
    pub name: String,
    /// Maximum concurrently admitted units of work.
    pub ceiling: Ceiling,
    /// Bound on one admission query in milliseconds.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
    /// Entries requested per backend page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Pages followed before failing closed.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Statuses counted toward the ceiling.
    #[serde(default = "default_count_statuses")]
    pub count_statuses: Vec<ExecutionStatus>,
    /// Optional ceiling refresh interval in seconds.
    #[serde(default)]
    pub ceiling_refresh_secs: Option<u64>,
}

impl ControllerConfig {
    /// Configuration with `ceiling` and defaults everywhere else.
    pub fn new(ceiling: Ceiling) -> Self {
        Self {
            name: default_name(),
            ceiling,
            query_timeout_ms: default_query_timeout_ms(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            count_statuses: default_count_statuses(),
            ceiling_refresh_secs: None,
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), AdmissionError> {
        if self.name.trim().is_empty() {
            return Err(AdmissionError::Config("name must not be empty".into()));
        }
        crate::core::validate_ceiling(self.ceiling)?;
        if self.ceiling_refresh_secs == Some(0) {
            return Err(AdmissionError::Config(
                "ceiling_refresh_secs must be greater than 0".into(),
            ));
        }
        self.limits().validate()
    }

    /// Counting limits derived from this configuration.
    pub fn limits(&self) -> ControllerLimits {
        ControllerLimits {
            query_timeout: Duration::from_millis(self.query_timeout_ms),
            page_size: self.page_size,
            max_pages: self.max_pages,
            count_statuses: self.count_statuses.clone(),
        }
    }

    /// Refresh interval, if refreshing is enabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.ceiling_refresh_secs.map(Duration::from_secs)
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, AdmissionError> {
        let cfg: Self = serde_json::from_str(input)
            .map_err(|e| AdmissionError::Config(format!("parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading controller config {}", path.display()))?;
        let cfg = Self::from_json_str(&raw)
            .with_context(|| format!("invalid controller config {}", path.display()))?;
        Ok(cfg)
    }

    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> Result<Self, AdmissionError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!("ignoring unreadable .env file: {}", err);
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AdmissionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ceiling = parse_ceiling(ENV_CEILING, lookup(ENV_CEILING).as_deref())?;
        let mut cfg = Self::new(ceiling);

        if let Some(name) = lookup(ENV_CONTROLLER_NAME) {
            cfg.name = name;
        }
        if let Some(raw) = lookup(ENV_QUERY_TIMEOUT_MS) {
            cfg.query_timeout_ms = parse_number(ENV_QUERY_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            cfg.page_size = parse_number(ENV_PAGE_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_PAGES) {
            cfg.max_pages = parse_number(ENV_MAX_PAGES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_COUNT_STATUSES) {
            cfg.count_statuses = raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse::<ExecutionStatus>)
                .collect::<Result<Vec<_>, _>>()?;
        }
        if let Some(raw) = lookup(ENV_CEILING_REFRESH_SECS) {
            cfg.ceiling_refresh_secs = Some(parse_number(ENV_CEILING_REFRESH_SECS, &raw)?);
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

/// Parse a ceiling value named `var`. Missing, non-numeric and zero values fail.
pub fn parse_ceiling(var: &str, raw: Option<&str>) -> Result<Ceiling, AdmissionError> {
    let raw = raw.ok_or_else(|| AdmissionError::Config(format!("{var} is not set")))?;
    let ceiling: Ceiling = parse_number(var, raw)?;
    crate::core::validate_ceiling(ceiling)
        .map_err(|_| AdmissionError::Config(format!("{var} must be a positive integer, got `{raw}`")))?;
    Ok(ceiling)
}

/// Digits only: `str::parse` would also take a leading `+`.
fn parse_number<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, AdmissionError> {
    let invalid = || AdmissionError::Config(format!("{var} must be a non-negative integer, got `{raw}`"));
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    digits.parse().map_err(|_| invalid())
}
