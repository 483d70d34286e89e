//! Success handoff - open the backend in the platform browser
//!
//! The handoff is a full navigation away from the splash, so it is delegated
//! to the operating system's URL opener rather than rendered in-process.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::application::error::SplashError;
use crate::application::ports::Navigator;

/// Navigator that launches the system URL opener
#[derive(Debug, Clone)]
pub struct BrowserNavigator {
    program: String,
    leading_args: Vec<String>,
}

impl BrowserNavigator {
    /// Use an explicit opener program, e.g. a specific browser binary
    pub fn with_program(program: impl Into<String>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    fn command_for(&self, url: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.leading_args).arg(url);
        command
    }
}

impl Default for BrowserNavigator {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            Self::with_program("open", Vec::new())
        } else if cfg!(target_os = "windows") {
            // `start` treats the first quoted argument as a window title
            Self::with_program("cmd", vec!["/C".into(), "start".into(), String::new()])
        } else {
            Self::with_program("xdg-open", Vec::new())
        }
    }
}

#[async_trait]
impl Navigator for BrowserNavigator {
    async fn navigate(&self, url: &str) -> Result<(), SplashError> {
        info!(url, opener = %self.program, "Opening backend");

        let status = self
            .command_for(url)
            .status()
            .await
            .map_err(|e| SplashError::Handoff {
                url: url.to_string(),
                reason: format!("failed to launch {}: {e}", self.program),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(SplashError::Handoff {
                url: url.to_string(),
                reason: format!("{} exited with {status}", self.program),
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_opener_completes_handoff() {
        let navigator = BrowserNavigator::with_program("true", Vec::new());
        assert!(navigator.navigate("http://localhost:8000/").await.is_ok());
    }

    #[tokio::test]
    async fn failing_opener_reports_handoff_error() {
        let navigator = BrowserNavigator::with_program("false", Vec::new());
        let err = navigator.navigate("http://localhost:8000/").await.unwrap_err();
        assert!(matches!(err, SplashError::Handoff { .. }));
        assert!(err.to_string().contains("http://localhost:8000/"));
    }

    #[tokio::test]
    async fn missing_opener_reports_handoff_error() {
        let navigator = BrowserNavigator::with_program("cortex-splash-no-such-opener", Vec::new());
        let err = navigator.navigate("http://localhost:8000/").await.unwrap_err();
        assert!(err.to_string().contains("failed to launch"));
    }
}
