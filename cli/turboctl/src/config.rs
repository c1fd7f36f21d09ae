//! Configuration management.
//!
//! Handles:
//! - API server location and TLS settings
//! - Logging level and optional log file
//! - Poll loop timing for reservations
//!
//! Credentials are never stored; they come from flags or the environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use turbo_reservation::{
    PollConfig, DEFAULT_INITIAL_DELAY, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT,
};

use crate::error::CliError;

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

/// Path of the REST API below the server root.
const API_PATH: &str = "api/v3";

pub const ENV_SERVER_HOSTNAME: &str = "TURBO_SERVER_HOSTNAME";
pub const ENV_CLIENT_USERNAME: &str = "TURBO_CLIENT_USERNAME";
pub const ENV_CLIENT_PASSWORD: &str = "TURBO_CLIENT_PASSWORD";
pub const ENV_LOG_LEVEL: &str = "TURBO_PROVIDER_LOGLEVEL";
pub const ENV_LOG_FILE: &str = "TURBO_PROVIDER_LOGFILE";

/// Keys accepted by `turboctl config set`.
pub const SETTABLE_KEYS: &[&str] = &[
    "server_hostname",
    "server_protocol",
    "tls_insecure",
    "log_level",
    "log_file",
    "poll.timeout_secs",
    "poll.interval_secs",
    "poll.initial_delay_secs",
];

/// Get the config directory path.
fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "turbonomic", "turboctl")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

/// Path of the config file.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hostname (and optional port) of the Turbonomic server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_hostname: Option<String>,

    /// `https` or `http`.
    pub server_protocol: String,

    /// Skip TLS certificate verification.
    pub tls_insecure: bool,

    /// Log level filter, or `none` to disable logging.
    pub log_level: String,

    /// Also write JSON logs to this file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    pub poll: PollSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_hostname: None,
            server_protocol: "https".to_string(),
            tls_insecure: false,
            log_level: "info".to_string(),
            log_file: None,
            poll: PollSettings::default(),
        }
    }
}

/// Reservation poll timing, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub timeout_secs: u64,
    pub interval_secs: u64,
    pub initial_delay_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_POLL_TIMEOUT.as_secs(),
            interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            initial_delay_secs: DEFAULT_INITIAL_DELAY.as_secs(),
        }
    }
}

impl From<PollSettings> for PollConfig {
    fn from(settings: PollSettings) -> Self {
        Self {
            timeout: Duration::from_secs(settings.timeout_secs),
            min_interval: Duration::from_secs(settings.interval_secs),
            initial_delay: Duration::from_secs(settings.initial_delay_secs),
        }
    }
}

impl Config {
    /// Load config from disk, or return default.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;

            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to write config to {:?}", path))?;
            file.write_all(contents.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write config to {:?}", path))?;
        }

        Ok(())
    }

    /// Overlay environment variables on top of the file settings.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(hostname) = non_empty(ENV_SERVER_HOSTNAME) {
            self.server_hostname = Some(hostname);
        }
        if let Some(level) = non_empty(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(file) = non_empty(ENV_LOG_FILE) {
            self.log_file = Some(PathBuf::from(file));
        }
    }

    /// Base URL of the REST API, e.g. `https://turbo.example.com/api/v3`.
    pub fn api_url(&self) -> Result<String, CliError> {
        let hostname = self
            .server_hostname
            .as_deref()
            .map(str::trim)
            .filter(|hostname| !hostname.is_empty())
            .ok_or(CliError::MissingHostname)?;

        Ok(format!(
            "{}://{}/{}",
            self.server_protocol,
            hostname.trim_end_matches('/'),
            API_PATH
        ))
    }

    pub fn poll_config(&self) -> PollConfig {
        self.poll.into()
    }

    /// Set a single key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CliError> {
        let invalid = || CliError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let seconds = || value.parse::<u64>().map_err(|_| invalid());

        match key {
            "server_hostname" => {
                self.server_hostname = Some(value.to_string()).filter(|v| !v.is_empty());
            }
            "server_protocol" => match value {
                "http" | "https" => self.server_protocol = value.to_string(),
                _ => return Err(invalid()),
            },
            "tls_insecure" => self.tls_insecure = value.parse().map_err(|_| invalid())?,
            "log_level" => self.log_level = value.to_string(),
            "log_file" => {
                self.log_file = Some(PathBuf::from(value)).filter(|_| !value.is_empty());
            }
            "poll.timeout_secs" => self.poll.timeout_secs = seconds()?,
            "poll.interval_secs" => self.poll.interval_secs = seconds()?,
            "poll.initial_delay_secs" => self.poll.initial_delay_secs = seconds()?,
            _ => return Err(CliError::UnknownConfigKey(key.to_string())),
        }

        Ok(())
    }
}
