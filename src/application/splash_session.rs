//! Splash session - one hosting screen
//!
//! The session lives as long as the splash screen. It runs one
//! [`ReadinessPoller`] at a time and, when a run ends in the failure state,
//! waits for the user's retry request before starting a brand new run from
//! attempt 0. Retry requests that arrive while a run is still probing are
//! discarded.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::error::SplashError;
use crate::application::ports::{Navigator, ReadinessProbe};
use crate::application::readiness_poller::{PollOutcome, PollerSettings, ReadinessPoller};
use crate::domain::poll_state::PollState;

/// How the screen's lifetime ended
#[derive(Debug)]
pub enum SessionOutcome {
    /// Backend ready, navigation handed off
    HandedOff,
    /// Backend ready, but the handoff could not be performed
    HandoffFailed(SplashError),
    /// The screen was torn down
    TornDown,
    /// Left in the failure state and the retry control went away
    Abandoned,
}

/// Owns the poll state channel and the teardown token for one screen
pub struct SplashSession {
    probe: Arc<dyn ReadinessProbe>,
    navigator: Arc<dyn Navigator>,
    settings: PollerSettings,
    state_tx: watch::Sender<PollState>,
    shutdown: CancellationToken,
}

impl SplashSession {
    pub fn new(
        probe: Arc<dyn ReadinessProbe>,
        navigator: Arc<dyn Navigator>,
        settings: PollerSettings,
        shutdown: CancellationToken,
    ) -> Self {
        let (state_tx, _) = watch::channel(PollState::initial());
        Self {
            probe,
            navigator,
            settings,
            state_tx,
            shutdown,
        }
    }

    /// Read-only view of the poll state for the presentation layer
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state_tx.subscribe()
    }

    /// Token that tears the screen down when cancelled
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run poll runs until handoff, teardown, or an abandoned failure
    pub async fn run(&self, mut retry_rx: mpsc::Receiver<()>) -> SessionOutcome {
        let mut runs = 0_u32;
        loop {
            runs += 1;
            let poller = ReadinessPoller::new(
                self.probe.clone(),
                self.navigator.clone(),
                self.settings.clone(),
                self.state_tx.clone(),
                self.shutdown.child_token(),
            );
            debug!(run = runs, run_id = %poller.run_id(), "Starting poll run");

            match poller.run().await {
                PollOutcome::Succeeded => return SessionOutcome::HandedOff,
                PollOutcome::HandoffFailed(e) => return SessionOutcome::HandoffFailed(e),
                PollOutcome::Cancelled => return SessionOutcome::TornDown,
                PollOutcome::Failed => {}
            }

            // Only presses made while the failure view is showing count
            let mut stale = 0;
            while retry_rx.try_recv().is_ok() {
                stale += 1;
            }
            if stale > 0 {
                debug!(stale, "Discarded retry requests made while probing");
            }

            info!("Waiting for retry request");
            let request = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => return SessionOutcome::TornDown,
                request = retry_rx.recv() => request,
            };
            if request.is_none() {
                warn!("Retry control closed while in failure state");
                return SessionOutcome::Abandoned;
            }
            info!(run = runs + 1, "Manual restart requested");
        }
    }
}
