//! Configuration for the Trellis server
//!
//! Every setting comes from an environment variable with a default. Invalid
//! values are reported and replaced by the default rather than aborting.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use trellis_core::GenerationConfig;
use trellis_monitoring::MonitoringConfig;

use crate::error::{ServerError, ServerResult};

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub bind_address: String,

    /// Log filter, e.g. "info" or "info,trellis_core=debug"
    pub log_level: String,

    /// Emit JSON logs
    pub log_json: bool,

    /// Gemini API key; required to serve generations
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    pub gemini_model: String,

    /// Base URL of the Gemini REST API
    pub gemini_api_base_url: String,

    /// Upper bound for each oracle call
    pub oracle_timeout: Duration,

    /// Check plan props against component contracts
    pub strict_prop_validation: bool,

    /// Largest accepted request body
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: DEFAULT_HOST.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_api_base_url: DEFAULT_API_BASE_URL.to_string(),
            oracle_timeout: Duration::from_secs(DEFAULT_ORACLE_TIMEOUT_SECS),
            strict_prop_validation: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(port) = parse_var(&lookup, "SERVER_PORT") {
            config.port = port;
        }

        if let Some(host) = non_empty(&lookup, "SERVER_HOST") {
            config.bind_address = host;
        }

        if let Some(log_level) = non_empty(&lookup, "LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Some(log_json) = bool_var(&lookup, "LOG_JSON") {
            config.log_json = log_json;
        }

        config.gemini_api_key = non_empty(&lookup, "GEMINI_API_KEY");

        if let Some(model) = non_empty(&lookup, "GEMINI_MODEL") {
            config.gemini_model = model;
        }

        if let Some(base_url) = non_empty(&lookup, "GEMINI_API_BASE_URL") {
            config.gemini_api_base_url = base_url.trim_end_matches('/').to_string();
        }

        match parse_var::<u64>(&lookup, "ORACLE_TIMEOUT_SECS") {
            Some(0) => warn!("Invalid ORACLE_TIMEOUT_SECS value: 0"),
            Some(secs) => config.oracle_timeout = Duration::from_secs(secs),
            None => {}
        }

        if let Some(strict) = bool_var(&lookup, "STRICT_PROP_VALIDATION") {
            config.strict_prop_validation = strict;
        }

        match parse_var::<usize>(&lookup, "MAX_BODY_BYTES") {
            Some(0) => warn!("Invalid MAX_BODY_BYTES value: 0"),
            Some(bytes) => config.max_body_bytes = bytes,
            None => {}
        }

        config
    }

    /// The API key, or a configuration error when it is missing
    pub fn require_api_key(&self) -> ServerResult<&str> {
        self.gemini_api_key
            .as_deref()
            .ok_or_else(|| ServerError::ConfigError("GEMINI_API_KEY is not set".to_string()))
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            oracle_timeout: self.oracle_timeout,
            strict_props: self.strict_prop_validation,
        }
    }

    pub fn monitoring_config(&self) -> MonitoringConfig {
        MonitoringConfig {
            service_name: "trellis-server".to_string(),
            log_filter: self.log_level.clone(),
            json_logs: self.log_json,
            ..MonitoringConfig::default()
        }
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = non_empty(lookup, key)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Invalid {} value: {}", key, raw);
            None
        }
    }
}

fn bool_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let raw = non_empty(lookup, key)?;
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!("Invalid {} value: {}", key, raw);
            None
        }
    }
}
