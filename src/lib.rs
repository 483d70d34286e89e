//! Cortex Splash - startup readiness splash for the local Cortex backend
//!
//! Polls the backend's setup-status endpoint with a bounded number of
//! attempts, shows progress in the terminal, and hands off to the backend
//! once it acknowledges readiness. Optionally starts the backend itself and
//! owns that process for the lifetime of the splash.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ui;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::{SessionOutcome, SplashError, SplashSession};
use crate::infrastructure::{BackendProcess, BrowserNavigator, HealthCheckClient, SplashConfig, init_logging_with_config, log_system_info};
use crate::ui::{TerminalPresenter, spawn_retry_input};

/// Pending retry requests buffered while the failure view is up
const RETRY_QUEUE_CAPACITY: usize = 4;

/// Grace period for blocking tasks (the stdin reader) on exit
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Load config, start logging, and drive one splash session to its end
pub fn run() -> Result<()> {
    let config = SplashConfig::load().context("Failed to load splash configuration")?;
    init_logging_with_config(&config.logging).context("Failed to initialize logging")?;
    log_system_info();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build async runtime")?;

    let outcome = runtime.block_on(run_session(&config));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);

    match outcome? {
        SessionOutcome::HandedOff => {
            info!("Backend ready; splash handed off");
            Ok(())
        }
        SessionOutcome::TornDown => {
            info!("Splash torn down");
            Ok(())
        }
        SessionOutcome::HandoffFailed(e) => Err(e.into()),
        SessionOutcome::Abandoned => Err(anyhow!(SplashError::BackendUnresponsive {
            attempts: config.polling.max_attempts.saturating_add(1),
        })),
    }
}

async fn run_session(config: &SplashConfig) -> Result<SessionOutcome> {
    let probe = Arc::new(HealthCheckClient::from_settings(&config.backend)?);
    info!(url = %probe.status_url(), "Probing backend readiness");

    let backend = match &config.backend.launch_command {
        Some(argv) => Some(BackendProcess::spawn(argv)?),
        None => None,
    };

    // Ctrl-C cancels everything; `screen` also ends when the session does
    let shutdown = CancellationToken::new();
    let screen = shutdown.child_token();
    let session = SplashSession::new(
        probe,
        Arc::new(BrowserNavigator::default()),
        config.poller_settings()?,
        shutdown.clone(),
    );

    let presenter = tokio::spawn(TerminalPresenter::stdout().run(session.subscribe(), screen.clone()));
    let (retry_tx, retry_rx) = mpsc::channel(RETRY_QUEUE_CAPACITY);
    let input = spawn_retry_input(retry_tx, screen.clone());

    let ctrl_c = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => match signal {
                    Ok(()) => {
                        info!("Ctrl-C received; tearing down splash");
                        shutdown.cancel();
                    }
                    Err(e) => warn!("Failed to listen for Ctrl-C: {e}"),
                },
                () = shutdown.cancelled() => {}
            }
        }
    });

    let outcome = session.run(retry_rx).await;
    screen.cancel();

    match presenter.await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!("Splash renderer failed: {e}"),
        Err(e) => warn!("Splash renderer task failed: {e}"),
    }
    let _ = input.await;

    if let Some(mut process) = backend {
        if matches!(outcome, SessionOutcome::HandedOff) {
            info!("Keeping backend process running until Ctrl-C");
            tokio::select! {
                () = shutdown.cancelled() => {}
                status = process.wait() => match status {
                    Ok(status) => info!(%status, "Backend process exited"),
                    Err(e) => warn!("{e}"),
                },
            }
        }
        let exit = process.shutdown().await;
        info!(status = ?exit.status, "Backend process stopped");
    }

    shutdown.cancel();
    let _ = ctrl_c.await;

    Ok(outcome)
}
