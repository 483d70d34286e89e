//! Splash view model
//!
//! A pure mapping from poll state to the two mutually exclusive views of the
//! splash screen. Nothing here reads a clock, the terminal, or the network.

use crate::domain::poll_state::PollState;

/// Fixed chrome around both views
pub mod chrome {
    pub const BADGE: &str = "System Initializing";
    pub const TITLE: &str = "CORTEX";
    pub const SUBTITLE: &str = "INTELLIGENCE AGENT & COMMAND CENTER";
    pub const FOOTER: &str = "v0.1.0-alpha • Secure Desktop Instance";

    pub const FAILURE_ICON: &str = "⚡";
    pub const FAILURE_TITLE: &str = "CONNECTION INTERRUPTED";
    pub const RETRY_ACTION: &str = "RETRY CONNECTION";
    pub const RETRY_HINT: &str = "press Enter";
}

const BAR_FILLED: char = '█';
const BAR_EMPTY: char = '░';

/// What the splash shows for one state snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplashView {
    /// Probing or synced
    Progress { status: String, percent: u8 },
    /// Attempt bound exceeded; offers the restart control
    Failure {
        icon: &'static str,
        title: &'static str,
        message: String,
        action: &'static str,
    },
}

impl SplashView {
    /// The failure view is shown exactly when the state carries an error
    #[must_use]
    pub fn from_state(state: &PollState) -> Self {
        match &state.error {
            Some(message) => Self::Failure {
                icon: chrome::FAILURE_ICON,
                title: chrome::FAILURE_TITLE,
                message: message.clone(),
                action: chrome::RETRY_ACTION,
            },
            None => Self::Progress {
                status: state.status.clone(),
                percent: state.percent.min(100),
            },
        }
    }

    #[must_use]
    pub const fn offers_retry(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Text layout: header, view body, footer.
    ///
    /// `width` is the progress bar width in cells.
    #[must_use]
    pub fn lines(&self, width: usize) -> Vec<String> {
        let mut lines = vec![
            format!("[ {} ]", chrome::BADGE),
            String::new(),
            chrome::TITLE.to_string(),
            chrome::SUBTITLE.to_string(),
            String::new(),
        ];

        match self {
            Self::Progress { status, percent } => {
                lines.push(status.clone());
                lines.push(format!("{} {percent:>3}%", progress_bar(*percent, width)));
            }
            Self::Failure {
                icon,
                title,
                message,
                action,
            } => {
                lines.push(format!("{icon} {title}"));
                lines.push(message.clone());
                lines.push(String::new());
                lines.push(format!("[ {action} ] ({})", chrome::RETRY_HINT));
            }
        }

        lines.push(String::new());
        lines.push(chrome::FOOTER.to_string());
        lines
    }
}

/// Cells filled for `percent` on a bar of `width`: `round(width * percent / 100)`
#[must_use]
pub fn filled_cells(percent: u8, width: usize) -> usize {
    let percent = usize::from(percent.min(100));
    (width * percent + 50) / 100
}

fn progress_bar(percent: u8, width: usize) -> String {
    let filled = filled_cells(percent, width);
    let mut bar = String::with_capacity(width * BAR_FILLED.len_utf8());
    bar.extend(std::iter::repeat_n(BAR_FILLED, filled));
    bar.extend(std::iter::repeat_n(BAR_EMPTY, width - filled));
    bar
}
