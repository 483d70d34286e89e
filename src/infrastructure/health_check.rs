//! HTTP readiness probe for the local backend
//!
//! A thin reqwest client with a per-request timeout. Retries are not done
//! here; the readiness poller owns the cadence and the attempt bound.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use tracing::{debug, trace};
use url::Url;

use crate::application::error::SplashError;
use crate::application::ports::{ProbeFailure, ProbeOutcome, ReadinessProbe};
use crate::infrastructure::config::BackendSettings;

/// User agent sent with every probe
const USER_AGENT: &str = concat!("cortex-splash/", env!("CARGO_PKG_VERSION"));

/// Health-check client for `GET <base_url><status_path>`
#[derive(Debug, Clone)]
pub struct HealthCheckClient {
    client: Client,
    status_url: Url,
}

impl HealthCheckClient {
    /// Create a health-check client from backend settings
    pub fn from_settings(settings: &BackendSettings) -> Result<Self, SplashError> {
        let status_url = settings.status_url()?;
        // The backend is local; proxy environment variables must not reroute it
        let client = ClientBuilder::new()
            .no_proxy()
            .timeout(settings.request_timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, status_url })
    }

    #[must_use]
    pub const fn status_url(&self) -> &Url {
        &self.status_url
    }
}

#[async_trait]
impl ReadinessProbe for HealthCheckClient {
    async fn probe_once(&self) -> ProbeOutcome {
        trace!(url = %self.status_url, "Probing backend readiness");

        match self.client.get(self.status_url.clone()).send().await {
            Ok(response) if response.status().is_success() => ProbeOutcome::Ready,
            Ok(response) => {
                let status = response.status();
                debug!(url = %self.status_url, %status, "Readiness endpoint not acknowledging");
                ProbeOutcome::NotReady(ProbeFailure::Status(status.as_u16()))
            }
            Err(e) => {
                debug!(url = %self.status_url, "Readiness probe failed: {e}");
                ProbeOutcome::NotReady(ProbeFailure::Transport(e.to_string()))
            }
        }
    }
}
