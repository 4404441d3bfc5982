//! Centralized configuration management for patient-registry

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default registry backend
pub const DEFAULT_API_BASE_URL: &str = "https://patient-register.onrender.com/api";

/// File name of the spreadsheet export
pub const EXPORT_FILE_NAME: &str = "patient_data.xlsx";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the registry REST API (without the `/patients` suffix)
    pub api_base_url: String,
    /// Directory the spreadsheet export is written into
    pub export_dir: PathBuf,
    /// Log file used by the terminal UI and command runs
    pub log_file: PathBuf,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds; `None` waits indefinitely
    pub timeout_seconds: Option<u64>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            user_agent: "patient-registry/0.1.0".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            export_dir: PathBuf::from("."),
            log_file: PathBuf::from("patient_registry.log"),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let api_base_url = std::env::var("REGISTRY_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let export_dir = std::env::var("REGISTRY_EXPORT_DIR")
            .unwrap_or_else(|_| ".".to_string())
            .into();

        let log_file = std::env::var("REGISTRY_LOG_FILE")
            .unwrap_or_else(|_| "patient_registry.log".to_string())
            .into();

        let http = HttpConfig {
            timeout_seconds: parse_env_var("REGISTRY_HTTP_TIMEOUT_SECONDS")?,
            user_agent: std::env::var("REGISTRY_USER_AGENT")
                .unwrap_or_else(|_| "patient-registry/0.1.0".to_string()),
        };

        Ok(Config {
            api_base_url,
            export_dir,
            log_file,
            http,
        })
    }

    /// Replace the API base URL, e.g. from `--api-url`
    pub fn with_api_base_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.api_base_url = url;
        }
        self
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http.timeout_seconds.map(Duration::from_secs)
    }

    /// Full path of the spreadsheet export
    pub fn export_path(&self) -> PathBuf {
        self.export_dir.join(EXPORT_FILE_NAME)
    }

    /// Directory holding the log file
    pub fn log_dir(&self) -> &Path {
        match self.log_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.api_base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.api_base_url))?;
        if url.cannot_be_a_base() {
            return Err(anyhow::anyhow!(
                "API base URL cannot have paths appended: {}",
                self.api_base_url
            ));
        }

        std::fs::create_dir_all(&self.export_dir).with_context(|| {
            format!("Cannot create export directory: {}", self.export_dir.display())
        })?;

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
