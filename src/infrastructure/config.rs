//! Configuration infrastructure
//!
//! The splash runs with fixed production values. A config file may still be
//! dropped into the user config directory to adjust logging or to shrink
//! timings for local setups; every field that is missing falls back to the
//! constants in [`crate::domain::constants`].
//!
//! Only files are read. No environment source is attached, so the backend
//! address and timing cannot drift through the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::application::readiness_poller::PollerSettings;
use crate::domain::constants::{backend, polling};

/// Directory name under the user config directory
pub const APP_DIR_NAME: &str = "cortex-splash";

/// Config file stem; any extension the `config` crate knows is accepted
pub const CONFIG_FILE_STEM: &str = "splash";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config from file: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete splash configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SplashConfig {
    pub backend: BackendSettings,
    pub polling: PollingSettings,
    pub logging: LoggingConfig,
}

/// Where the backend lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Backend root; the handoff target
    pub base_url: String,
    /// Readiness endpoint, resolved against `base_url`
    pub status_path: String,
    /// Per-probe request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Program and arguments that start the backend; unset if it runs on its own
    pub launch_command: Option<Vec<String>>,
}

/// Probe loop bounds and timings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    pub max_attempts: u32,
    pub inter_probe_delay_ms: u64,
    pub settle_delay_ms: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Mirror logs to stderr (off by default; the splash owns the terminal)
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Override for the log directory; defaults to `<exe dir>/logs`
    pub log_dir: Option<PathBuf>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: backend::BASE_URL.to_string(),
            status_path: backend::STATUS_PATH.to_string(),
            request_timeout_ms: backend::REQUEST_TIMEOUT_MS,
            launch_command: None,
        }
    }
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            max_attempts: polling::MAX_ATTEMPTS,
            inter_probe_delay_ms: polling::INTER_PROBE_DELAY_MS,
            settle_delay_ms: polling::SETTLE_DELAY_MS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            console_output: false,
            file_output: true,
            log_dir: None,
        }
    }
}

impl BackendSettings {
    pub fn root_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.base_url)
    }

    pub fn status_url(&self) -> Result<Url, url::ParseError> {
        self.root_url()?.join(&self.status_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl PollingSettings {
    pub fn inter_probe_delay(&self) -> Duration {
        Duration::from_millis(self.inter_probe_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl SplashConfig {
    /// Get the application configuration directory
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
    }

    /// Load from the user config directory; a missing file means defaults
    pub fn load() -> Result<Self, ConfigError> {
        let Some(dir) = Self::config_dir() else {
            info!("No user config directory; using built-in configuration");
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        };
        Self::from_optional_file(&dir.join(CONFIG_FILE_STEM))
    }

    /// Load from an explicit file, which must exist
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::build(config::File::from(path))
    }

    fn from_optional_file(path: &Path) -> Result<Self, ConfigError> {
        Self::build(config::File::from(path).required(false))
    }

    fn build<S>(source: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder().add_source(source).build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Validation { message });

        if let Err(e) = self.backend.status_url() {
            return invalid(format!("backend URL '{}{}' is invalid: {e}", self.backend.base_url, self.backend.status_path));
        }
        if self.backend.status_path.trim().is_empty() {
            return invalid("status_path must not be empty".to_string());
        }
        if self.backend.request_timeout_ms == 0 {
            return invalid("request_timeout_ms must be greater than 0".to_string());
        }
        if let Some(argv) = &self.backend.launch_command {
            if argv.first().is_none_or(|program| program.trim().is_empty()) {
                return invalid("launch_command must name a program".to_string());
            }
        }
        if self.polling.max_attempts == 0 {
            return invalid("max_attempts must be greater than 0".to_string());
        }
        if self.polling.inter_probe_delay_ms == 0 {
            return invalid("inter_probe_delay_ms must be greater than 0".to_string());
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return invalid(format!("unknown log level '{}'", self.logging.level));
        }
        if !self.logging.file_output && !self.logging.console_output {
            return invalid("at least one of file_output / console_output must be enabled".to_string());
        }
        Ok(())
    }

    /// Settings for the readiness poller
    pub fn poller_settings(&self) -> Result<PollerSettings, ConfigError> {
        let handoff = self.backend.root_url().map_err(|e| ConfigError::Validation {
            message: format!("backend base_url is invalid: {e}"),
        })?;
        Ok(PollerSettings {
            max_attempts: self.polling.max_attempts,
            inter_probe_delay: self.polling.inter_probe_delay(),
            settle_delay: self.polling.settle_delay(),
            handoff_url: handoff.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(ext: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(ext).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_fixed_constants() {
        let config = SplashConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.backend.status_url().unwrap().as_str(), "http://localhost:8000/api/setup/status");
        assert_eq!(config.polling.max_attempts, 80);
        assert_eq!(config.polling.inter_probe_delay(), Duration::from_millis(1200));
        assert_eq!(config.polling.settle_delay(), Duration::from_millis(800));
        assert!(config.logging.file_output);
        assert!(!config.logging.console_output);
    }

    #[test]
    fn poller_settings_follow_config() {
        let settings = SplashConfig::default().poller_settings().unwrap();
        let defaults = PollerSettings::default();
        assert_eq!(settings.handoff_url, "http://localhost:8000/");
        assert_eq!(settings.handoff_url, defaults.handoff_url);
        assert_eq!(settings.max_attempts, defaults.max_attempts);
        assert_eq!(settings.inter_probe_delay, defaults.inter_probe_delay);
        assert_eq!(settings.settle_delay, defaults.settle_delay);
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let file = write_config(
            ".toml",
            "[polling]\ninter_probe_delay_ms = 50\n\n[logging]\nlevel = \"debug\"\n",
        );

        let config = SplashConfig::from_file(file.path()).unwrap();

        assert_eq!(config.polling.inter_probe_delay_ms, 50);
        assert_eq!(config.polling.max_attempts, 80);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.backend.base_url, "http://localhost:8000");
    }

    #[test]
    fn launch_command_is_read_from_file() {
        let file = write_config(
            ".toml",
            "[backend]\nlaunch_command = [\"cortex-agent\", \"--port\", \"8000\"]\n",
        );

        let config = SplashConfig::from_file(file.path()).unwrap();

        assert_eq!(
            config.backend.launch_command,
            Some(vec!["cortex-agent".to_string(), "--port".to_string(), "8000".to_string()])
        );
        assert!(SplashConfig::default().backend.launch_command.is_none());
    }

    #[test]
    fn blank_launch_program_is_rejected() {
        let file = write_config(".toml", "[backend]\nlaunch_command = [\"  \"]\n");

        let err = SplashConfig::from_file(file.path()).unwrap_err();

        assert!(err.to_string().contains("launch_command"));
    }

    #[test]
    fn zero_attempt_bound_is_rejected() {
        let file = write_config(".toml", "[polling]\nmax_attempts = 0\n");

        let err = SplashConfig::from_file(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::Validation { .. }));
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut config = SplashConfig::default();
        config.polling.inter_probe_delay_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SplashConfig::default();
        config.backend.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = SplashConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = SplashConfig::default();
        config.logging.file_output = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_optional_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SplashConfig::from_optional_file(&dir.path().join(CONFIG_FILE_STEM)).unwrap();
        assert_eq!(config.polling.max_attempts, 80);
    }

    #[test]
    fn missing_required_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SplashConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
    }
}
