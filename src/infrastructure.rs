//! Infrastructure layer for the backend probe, navigation, configuration and logging
//!
//! This module provides the concrete implementations of the application
//! ports plus the ambient configuration and logging setup.

pub mod backend_process;
pub mod config;
pub mod health_check;
pub mod logging;
pub mod navigator;

// Re-export commonly used items
pub use backend_process::{BackendExit, BackendProcess};
pub use config::{BackendSettings, ConfigError, LoggingConfig, PollingSettings, SplashConfig};
pub use health_check::HealthCheckClient;
pub use logging::{get_log_directory, init_logging_with_config, log_system_info};
pub use navigator::BrowserNavigator;
