// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Engine-level configuration.
//!
//! [`AcsConfig`] is the single entry point for tuning the service at
//! construction time. All fields have sensible defaults so that
//! `AcsConfig::default()` is always a valid starting point. Values may be
//! layered from a TOML file and `ACS_`-prefixed environment variables via
//! [`AcsConfig::load`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level configuration for an [`crate::AcsEngine`]-style consumer.
///
/// # Examples
///
/// ```rust
/// use acs_core::config::AcsConfig;
///
/// let config = AcsConfig {
///     command_queue_capacity: 2048,
///     ..AcsConfig::default()
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcsConfig {
    /// Bound on the single-writer command channel. Submissions beyond this
    /// depth are rejected with `ErrorKind::Backpressure` rather than queued
    /// unbounded.
    #[serde(default = "default_command_queue_capacity")]
    pub command_queue_capacity: usize,

    /// Maximum permission-evaluation cache entries per tenant.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,

    /// Time-to-live for cached evaluation outcomes, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Minimum number of samples in the circuit breaker's sliding window
    /// before an error rate is evaluated.
    #[serde(default = "default_circuit_breaker_window")]
    pub circuit_breaker_window: usize,

    /// Error rate (0.0-1.0) within the sliding window that opens the
    /// circuit.
    #[serde(default = "default_circuit_breaker_threshold")]
    pub circuit_breaker_error_rate: f64,

    /// Duration the circuit stays open before probing half-open, in
    /// milliseconds.
    #[serde(default = "default_circuit_breaker_open_ms")]
    pub circuit_breaker_open_ms: u64,

    /// Maximum retry attempts for a retryable repository operation.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay for retries, in milliseconds (doubled per
    /// attempt, plus jitter).
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Audit records older than this many days are eligible for purge.
    #[serde(default = "default_audit_retention_days")]
    pub audit_retention_days: u32,

    /// `change_type` prefixes exempted from retention purge regardless of
    /// age.
    #[serde(default = "default_preserved_prefixes")]
    pub preserved_change_type_prefixes: Vec<String>,

    /// Postgres connection string used by `acs-repository`'s
    /// `PostgresRepository`. Ignored when the in-memory repository is
    /// selected.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Bind address for the HTTP surface exposed by `acs-server`.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Verbosity of the `tracing` subscriber installed by `acs-server`.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Minimum number of commands the writer must have processed before
    /// `health()` reports anything other than `HealthStatus::Unknown` — a
    /// freshly started engine hasn't seen enough traffic to say anything
    /// meaningful about circuit or buffer pressure yet.
    #[serde(default = "default_health_sample_floor")]
    pub health_sample_floor: u64,
}

fn default_command_queue_capacity() -> usize {
    4096
}
fn default_cache_capacity() -> u64 {
    100_000
}
fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_circuit_breaker_window() -> usize {
    10
}
fn default_circuit_breaker_threshold() -> f64 {
    0.25
}
fn default_circuit_breaker_open_ms() -> u64 {
    30_000
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_base_delay_ms() -> u64 {
    50
}
fn default_audit_retention_days() -> u32 {
    365
}
fn default_preserved_prefixes() -> Vec<String> {
    vec!["SECURITY:".to_string(), "SYSTEM:".to_string()]
}
fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}
fn default_health_sample_floor() -> u64 {
    10
}

impl Default for AcsConfig {
    fn default() -> Self {
        Self {
            command_queue_capacity: default_command_queue_capacity(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
            circuit_breaker_window: default_circuit_breaker_window(),
            circuit_breaker_error_rate: default_circuit_breaker_threshold(),
            circuit_breaker_open_ms: default_circuit_breaker_open_ms(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            audit_retention_days: default_audit_retention_days(),
            preserved_change_type_prefixes: default_preserved_prefixes(),
            database_url: None,
            listen_addr: default_listen_addr(),
            log_level: LogLevel::default(),
            health_sample_floor: default_health_sample_floor(),
        }
    }
}

/// Verbosity enumeration mirrored onto `tracing_subscriber::EnvFilter`
/// directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Errors that can occur while loading or parsing [`AcsConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

impl AcsConfig {
    /// Load configuration by layering, in increasing priority:
    ///
    /// 1. Compiled-in defaults ([`AcsConfig::default`]).
    /// 2. An optional TOML file at `path`, if it exists.
    /// 3. `ACS_`-prefixed environment variables (e.g. `ACS_LISTEN_ADDR`,
    ///    `ACS__CACHE_CAPACITY`).
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use acs_core::config::AcsConfig;
    /// let cfg = AcsConfig::load(Some("config/acs.toml")).unwrap();
    /// ```
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let defaults = AcsConfig::default();
        let mut builder = config::Config::builder().add_source(
            config::Config::try_from(&defaults).map_err(ConfigError::Load)?,
        );

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("ACS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settled = builder.build().map_err(ConfigError::Load)?;
        settled.try_deserialize().map_err(ConfigError::Load)
    }
}
