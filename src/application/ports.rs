//! Ports implemented by the infrastructure layer
//!
//! The poller talks to the backend and to the navigation target only through
//! these traits, so tests can drive the state machine with scripted fakes.

use async_trait::async_trait;

use crate::application::error::SplashError;

/// Why a probe did not count as ready. Used for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The endpoint answered with a non-2xx status
    Status(u16),
    /// Connection error, timeout or any other transport problem
    Transport(String),
}

impl std::fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {code}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

/// Outcome of a single readiness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Ready,
    NotReady(ProbeFailure),
}

/// One readiness check against the backend
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Perform one check. Every failure mode resolves to `NotReady`.
    async fn probe_once(&self) -> ProbeOutcome;
}

/// Full navigation to the backend once it is ready
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), SplashError>;
}
