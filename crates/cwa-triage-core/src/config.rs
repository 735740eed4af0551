//! Runtime configuration.
//!
//! Resolved once at startup and passed into the workflow. Nothing below this
//! module reads environment variables.

use std::path::{Path, PathBuf};

use crate::error::{TriageError, TriageResult};

pub const ENV_API_BASE_URL: &str = "CWA_API_BASE_URL";
pub const ENV_API_TIMEOUT_SECS: &str = "CWA_API_TIMEOUT_SECS";
pub const ENV_REPORT_DIR: &str = "CWA_REPORT_DIR";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REPORT_DIR: &str = ".";

/// Where matching and treatment lookups are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Builtin catalog and directory
    Local,
    /// The external prediction service
    Remote,
}

/// Configuration resolved at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageConfig {
    api_base_url: Option<String>,
    api_timeout_secs: u64,
    report_dir: PathBuf,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            api_timeout_secs: DEFAULT_TIMEOUT_SECS,
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
        }
    }
}

impl TriageConfig {
    /// Create a configuration. Without a base URL the workflow runs locally.
    pub fn new(
        api_base_url: Option<String>,
        api_timeout_secs: u64,
        report_dir: PathBuf,
    ) -> TriageResult<Self> {
        if let Some(url) = &api_base_url {
            if url.trim().is_empty() {
                return Err(TriageError::Config("API base URL cannot be empty".into()));
            }
        }
        if api_timeout_secs == 0 {
            return Err(TriageError::Config(
                "API timeout must be at least one second".into(),
            ));
        }

        Ok(Self {
            api_base_url: api_base_url.map(|url| url.trim().to_string()),
            api_timeout_secs,
            report_dir,
        })
    }

    /// Resolve from the process environment.
    pub fn from_env() -> TriageResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from any key lookup. Unset or blank variables take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> TriageResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout = match get(ENV_API_TIMEOUT_SECS) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                TriageError::Config(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    ENV_API_TIMEOUT_SECS, raw
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let report_dir = get(ENV_REPORT_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR));

        Self::new(get(ENV_API_BASE_URL), timeout, report_dir)
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> TriageResult<Self> {
        self.api_base_url = Some(url.into());
        Self::new(self.api_base_url, self.api_timeout_secs, self.report_dir)
    }

    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }

    pub fn api_timeout_secs(&self) -> u64 {
        self.api_timeout_secs
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    pub fn mode(&self) -> MatchMode {
        match self.api_base_url {
            Some(_) => MatchMode::Remote,
            None => MatchMode::Local,
        }
    }
}
