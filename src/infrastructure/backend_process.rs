//! Locally launched backend process
//!
//! When `[backend] launch_command` is set, the splash starts the backend
//! itself and owns it: stdout and stderr lines go to the log, and the
//! process is killed when the splash tears down. After a successful handoff
//! the backend keeps running until the splash exits.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::error::SplashError;

/// Time allowed for the killed process and its output to drain
const KILL_GRACE: Duration = Duration::from_millis(500);

/// Which pipe a forwarded line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl std::fmt::Display for OutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// How the backend process ended
#[derive(Debug)]
pub struct BackendExit {
    /// `None` if the process could not be reaped within the grace period
    pub status: Option<ExitStatus>,
    pub stdout_lines: usize,
    pub stderr_lines: usize,
}

/// A backend child process owned by the splash
#[derive(Debug)]
pub struct BackendProcess {
    child: Child,
    program: String,
    stdout_pump: Option<JoinHandle<usize>>,
    stderr_pump: Option<JoinHandle<usize>>,
}

impl BackendProcess {
    /// Spawn `argv[0]` with the remaining arguments
    pub fn spawn(argv: &[String]) -> Result<Self, SplashError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(SplashError::BackendLaunch {
                program: String::new(),
                reason: "launch command is empty".to_string(),
            });
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SplashError::BackendLaunch {
                program: program.clone(),
                reason: e.to_string(),
            })?;

        info!(program = %program, pid = ?child.id(), "Backend process started");

        let stdout_pump = child
            .stdout
            .take()
            .map(|out| tokio::spawn(forward_lines(out, OutputStream::Stdout)));
        let stderr_pump = child
            .stderr
            .take()
            .map(|err| tokio::spawn(forward_lines(err, OutputStream::Stderr)));

        Ok(Self {
            child,
            program: program.clone(),
            stdout_pump,
            stderr_pump,
        })
    }

    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the process to exit on its own
    pub async fn wait(&mut self) -> Result<ExitStatus, SplashError> {
        self.child.wait().await.map_err(|e| SplashError::BackendLaunch {
            program: self.program.clone(),
            reason: format!("failed to wait for process: {e}"),
        })
    }

    /// Kill the process if it is still running and collect its output counts
    pub async fn shutdown(mut self) -> BackendExit {
        let status = match self.child.try_wait() {
            Ok(Some(status)) => Some(status),
            _ => {
                info!(program = %self.program, "Stopping backend process");
                if let Err(e) = self.child.start_kill() {
                    debug!("Backend process already gone: {e}");
                }
                match tokio::time::timeout(KILL_GRACE, self.child.wait()).await {
                    Ok(Ok(status)) => Some(status),
                    Ok(Err(e)) => {
                        warn!("Failed to reap backend process: {e}");
                        None
                    }
                    Err(_) => {
                        warn!(program = %self.program, "Backend process did not exit within {KILL_GRACE:?}");
                        None
                    }
                }
            }
        };

        let stdout_lines = join_pump(self.stdout_pump.take()).await;
        let stderr_lines = join_pump(self.stderr_pump.take()).await;
        debug!(?status, stdout_lines, stderr_lines, "Backend process finished");

        BackendExit {
            status,
            stdout_lines,
            stderr_lines,
        }
    }
}

async fn join_pump(pump: Option<JoinHandle<usize>>) -> usize {
    let Some(mut pump) = pump else {
        return 0;
    };
    // A grandchild may still hold the pipe open
    match tokio::time::timeout(KILL_GRACE, &mut pump).await {
        Ok(Ok(lines)) => lines,
        Ok(Err(e)) => {
            warn!("Backend output task failed: {e}");
            0
        }
        Err(_) => {
            pump.abort();
            0
        }
    }
}

/// Log every line of `reader`; returns the number of lines forwarded
async fn forward_lines<R>(reader: R, stream: OutputStream) -> usize
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut count = 0;
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                count += 1;
                match stream {
                    OutputStream::Stdout => info!(target: "backend", %stream, "{}", line.trim_end()),
                    OutputStream::Stderr => warn!(target: "backend", %stream, "{}", line.trim_end()),
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(%stream, "Backend output closed: {e}");
                break;
            }
        }
    }
    count
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into()]
    }

    #[tokio::test]
    async fn output_lines_are_forwarded_from_both_streams() {
        let mut backend = BackendProcess::spawn(&sh("echo ready; echo booting; echo oops >&2")).unwrap();
        assert!(backend.wait().await.unwrap().success());

        let exit = backend.shutdown().await;
        assert_eq!(exit.stdout_lines, 2);
        assert_eq!(exit.stderr_lines, 1);
        assert!(exit.status.is_some_and(|s| s.success()));
    }

    #[tokio::test]
    async fn shutdown_kills_a_running_backend() {
        let backend = BackendProcess::spawn(&sh("echo up; exec sleep 30")).unwrap();
        assert!(backend.id().is_some());

        let exit = tokio::time::timeout(Duration::from_secs(5), backend.shutdown()).await.unwrap();
        let status = exit.status.expect("killed process is reaped");
        assert!(!status.success());
    }

    #[tokio::test]
    async fn missing_program_is_a_launch_error() {
        let err = BackendProcess::spawn(&["cortex-splash-no-such-backend".to_string()]).unwrap_err();
        assert!(matches!(err, SplashError::BackendLaunch { .. }));
        assert!(err.to_string().contains("cortex-splash-no-such-backend"));
    }

    #[test]
    fn empty_command_is_rejected() {
        let err = BackendProcess::spawn(&[]).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn forward_lines_counts_every_line() {
        let count = forward_lines(b"one\ntwo\r\nthree".as_slice(), OutputStream::Stdout).await;
        assert_eq!(count, 3);
    }
}
