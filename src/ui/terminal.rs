//! Terminal rendering of the splash and the retry key

use std::io::{self, Write};

use crossterm::{
    cursor, execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::poll_state::PollState;
use crate::ui::splash_view::SplashView;

/// Upper bound on the progress bar width
const MAX_BAR_WIDTH: usize = 48;

/// Redraws the splash on every state change until torn down
pub struct TerminalPresenter<W: Write> {
    out: W,
    /// Fixed bar width; `None` follows the terminal size
    bar_width: Option<usize>,
}

impl TerminalPresenter<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out,
            bar_width: None,
        }
    }

    #[must_use]
    pub fn with_bar_width(mut self, width: usize) -> Self {
        self.bar_width = Some(width);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn bar_width(&self) -> usize {
        self.bar_width.unwrap_or_else(|| {
            let (columns, _) = terminal::size().unwrap_or((80, 24));
            usize::from(columns).saturating_sub(8).min(MAX_BAR_WIDTH)
        })
    }

    /// Draw one frame for the given state
    pub fn render(&mut self, state: &PollState) -> io::Result<()> {
        let view = SplashView::from_state(state);
        let lines = view.lines(self.bar_width());
        let accent = if view.offers_retry() { Color::Red } else { Color::Cyan };

        queue!(self.out, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
        for (index, line) in lines.iter().enumerate() {
            if index == 2 {
                queue!(
                    self.out,
                    SetForegroundColor(accent),
                    SetAttribute(Attribute::Bold),
                    Print(line),
                    SetAttribute(Attribute::Reset),
                    ResetColor
                )?;
            } else {
                queue!(self.out, Print(line))?;
            }
            queue!(self.out, Print("\r\n"))?;
        }
        self.out.flush()
    }

    /// Render until `shutdown` fires or the state channel closes
    pub async fn run(mut self, mut state_rx: watch::Receiver<PollState>, shutdown: CancellationToken) -> io::Result<W> {
        execute!(self.out, cursor::Hide)?;

        let result = loop {
            let state = state_rx.borrow_and_update().clone();
            if let Err(e) = self.render(&state) {
                break Err(e);
            }

            tokio::select! {
                biased;
                () = shutdown.cancelled() => break Ok(()),
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        debug!("Poll state channel closed; presenter stopping");
                        break Ok(());
                    }
                }
            }
        };

        // Leave the last frame on screen and restore the cursor
        execute!(self.out, cursor::Show, Print("\r\n"))?;
        result.map(|()| self.out)
    }
}

/// Forward each line read from stdin as a restart request
pub fn spawn_retry_input(retry_tx: mpsc::Sender<()>, shutdown: CancellationToken) -> JoinHandle<()> {
    spawn_retry_input_from(tokio::io::stdin(), retry_tx, shutdown)
}

/// Same as [`spawn_retry_input`] over an arbitrary reader
pub fn spawn_retry_input_from<R>(reader: R, retry_tx: mpsc::Sender<()>, shutdown: CancellationToken) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            let line = tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                line = lines.next_line() => line,
            };
            match line {
                Ok(Some(_)) => {
                    // A full queue already holds a pending request
                    if retry_tx.try_send(()).is_err() && retry_tx.is_closed() {
                        break;
                    }
                }
                Ok(None) => {
                    debug!("Retry input reached end of stream");
                    break;
                }
                Err(e) => {
                    warn!("Failed to read retry input: {e}");
                    break;
                }
            }
        }
    })
}
