//! Readiness poller - the probe state machine
//!
//! One poller drives one run of the splash sequence: probe, fold the outcome
//! into [`PollState`], publish the new state, then either wait and probe
//! again, hand off to the backend, or stop in the failure state.
//!
//! Probes never overlap: the next probe is only issued after the previous one
//! resolved and the inter-probe delay elapsed. Every suspension point is raced
//! against the run's [`CancellationToken`], and the token is checked again
//! after each probe resolves, so a torn-down screen never sees another state
//! change or a navigation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::application::error::SplashError;
use crate::application::ports::{Navigator, ProbeOutcome, ReadinessProbe};
use crate::domain::constants::{backend, polling};
use crate::domain::poll_state::{FailureDisposition, PollState};

/// Bounds and timings of one poll run
#[derive(Debug, Clone)]
pub struct PollerSettings {
    /// Failed probes tolerated before terminal failure
    pub max_attempts: u32,
    /// Pause between consecutive probes
    pub inter_probe_delay: Duration,
    /// Pause between success and the handoff
    pub settle_delay: Duration,
    /// Target of the success handoff
    pub handoff_url: String,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            max_attempts: polling::MAX_ATTEMPTS,
            inter_probe_delay: Duration::from_millis(polling::INTER_PROBE_DELAY_MS),
            settle_delay: Duration::from_millis(polling::SETTLE_DELAY_MS),
            handoff_url: format!("{}/", backend::BASE_URL.trim_end_matches('/')),
        }
    }
}

/// How a poll run ended
#[derive(Debug)]
pub enum PollOutcome {
    /// Backend ready and the handoff navigation went through
    Succeeded,
    /// Backend ready but the single handoff attempt failed
    HandoffFailed(SplashError),
    /// Attempt bound exceeded; the state carries the error text
    Failed,
    /// The hosting screen was torn down before the run finished
    Cancelled,
}

/// Drives repeated probes for one run of the splash sequence
pub struct ReadinessPoller {
    probe: Arc<dyn ReadinessProbe>,
    navigator: Arc<dyn Navigator>,
    settings: PollerSettings,
    state: PollState,
    state_tx: watch::Sender<PollState>,
    cancel: CancellationToken,
    run_id: Uuid,
}

impl ReadinessPoller {
    /// Create a poller with a fresh [`PollState`]
    pub fn new(
        probe: Arc<dyn ReadinessProbe>,
        navigator: Arc<dyn Navigator>,
        settings: PollerSettings,
        state_tx: watch::Sender<PollState>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            probe,
            navigator,
            settings,
            state: PollState::initial(),
            state_tx,
            cancel,
            run_id: Uuid::new_v4(),
        }
    }

    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Run the probe loop to a terminal state or until teardown
    pub async fn run(mut self) -> PollOutcome {
        let span = info_span!("poll_run", run_id = %self.run_id);
        self.run_loop().instrument(span).await
    }

    async fn run_loop(&mut self) -> PollOutcome {
        if self.cancel.is_cancelled() {
            return self.torn_down("before start");
        }

        // A restart reuses the channel, so the fresh state must replace the old one
        self.publish();
        info!(
            max_attempts = self.settings.max_attempts,
            delay = ?self.settings.inter_probe_delay,
            "Readiness polling started"
        );

        loop {
            let outcome = tokio::select! {
                biased;
                () = self.cancel.cancelled() => None,
                outcome = self.probe.probe_once() => Some(outcome),
            };
            let Some(outcome) = outcome else {
                return self.torn_down("probe in flight");
            };
            if self.cancel.is_cancelled() {
                return self.torn_down("probe resolved after teardown");
            }

            let reason = match outcome {
                ProbeOutcome::Ready => return self.finish_success().await,
                ProbeOutcome::NotReady(reason) => reason,
            };

            match self.state.record_failure(self.settings.max_attempts) {
                FailureDisposition::Retry => {
                    self.publish();
                    debug!(
                        attempts = self.state.attempts,
                        percent = self.state.percent,
                        %reason,
                        "Backend not ready, retrying"
                    );
                    if !self.sleep_or_cancel(self.settings.inter_probe_delay).await {
                        return self.torn_down("inter-probe delay");
                    }
                }
                FailureDisposition::Exhausted => {
                    self.publish();
                    let err = SplashError::BackendUnresponsive { attempts: self.state.attempts };
                    warn!(attempts = self.state.attempts, phase = %self.state.phase, %reason, "{err}");
                    return PollOutcome::Failed;
                }
                FailureDisposition::Terminal => return PollOutcome::Failed,
            }
        }
    }

    async fn finish_success(&mut self) -> PollOutcome {
        self.state.mark_synced();
        self.publish();
        info!(attempts = self.state.attempts, phase = %self.state.phase, "Backend acknowledged readiness");

        if !self.sleep_or_cancel(self.settings.settle_delay).await {
            return self.torn_down("settle delay");
        }

        let url = self.settings.handoff_url.as_str();
        match self.navigator.navigate(url).await {
            Ok(()) => {
                info!(url, "Handed off to backend");
                PollOutcome::Succeeded
            }
            Err(e) => {
                error!(url, "Handoff failed: {e}");
                PollOutcome::HandoffFailed(e)
            }
        }
    }

    /// Returns `false` if the run was torn down before the delay elapsed
    async fn sleep_or_cancel(&self, delay: Duration) -> bool {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => false,
            () = tokio::time::sleep(delay) => true,
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }

    fn torn_down(&self, during: &str) -> PollOutcome {
        info!(attempts = self.state.attempts, phase = %self.state.phase, during, "Poll run torn down");
        PollOutcome::Cancelled
    }
}
