//! Runtime configuration read from the environment and an optional `.env` file.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const API_URL_ENV: &str = "LIBRARY_API_URL";
pub const API_TOKEN_ENV: &str = "LIBRARY_API_TOKEN";
pub const OUTPUT_DIR_ENV: &str = "LIBRARY_REPORT_OUTPUT_DIR";
pub const SESSION_TIMEOUT_ENV: &str = "LIBRARY_SESSION_TIMEOUT_MINUTES";

const DEFAULT_SESSION_TIMEOUT_MINUTES: u64 = 30;

/// Settings for a report run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub output_dir: PathBuf,
    pub session_timeout: Duration,
    pub fonts_dir: Option<PathBuf>,
}

impl ReportConfig {
    /// Loads `.env` if present and reads the configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|_| None)
    }

    /// Like [`ReportConfig::from_env`], but values returned by `overrides`
    /// take precedence over the environment.
    pub fn from_env_with<F>(overrides: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| overrides(name).or_else(|| env::var(name).ok()))
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_base_url = non_empty(API_URL_ENV).ok_or(ConfigError::Missing(API_URL_ENV))?;

        let session_timeout = match non_empty(SESSION_TIMEOUT_ENV) {
            Some(value) => {
                let minutes = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::Invalid {
                        name: SESSION_TIMEOUT_ENV,
                        value: value.clone(),
                    })?;
                Duration::from_secs(minutes * 60)
            }
            None => Duration::from_secs(DEFAULT_SESSION_TIMEOUT_MINUTES * 60),
        };

        Ok(Self {
            api_base_url,
            api_token: non_empty(API_TOKEN_ENV),
            output_dir: non_empty(OUTPUT_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            session_timeout,
            fonts_dir: non_empty(crate::fonts::FONTS_DIR_ENV).map(PathBuf::from),
        })
    }
}
