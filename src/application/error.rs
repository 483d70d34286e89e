//! Error types for the splash client

use thiserror::Error;

use crate::domain::constants::status;

/// Errors surfaced by the splash client
///
/// Only `BackendUnresponsive` ever reaches the user through the splash view;
/// individual probe failures are absorbed by the poller.
#[derive(Debug, Error)]
pub enum SplashError {
    #[error("{}", status::BACKEND_UNRESPONSIVE)]
    BackendUnresponsive { attempts: u32 },

    #[error("Failed to hand off to {url}: {reason}")]
    Handoff { url: String, reason: String },

    #[error("Failed to launch backend '{program}': {reason}")]
    BackendLaunch { program: String, reason: String },

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
