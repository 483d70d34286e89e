//! Poll state entity
//!
//! `PollState` is the single piece of state the splash screen owns. The
//! readiness poller is its only writer; the presentation layer only ever sees
//! published snapshots of it.

use crate::domain::constants::{polling, status};

/// Phase of the probe state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// Probing; more probes may follow
    Running,
    /// Backend acknowledged a probe (terminal)
    Succeeded,
    /// Attempt bound exceeded (terminal)
    Failed,
}

impl std::fmt::Display for PollPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::Succeeded => write!(f, "SUCCEEDED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Result of folding one failed probe into the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDisposition {
    /// Still within the bound; schedule another probe
    Retry,
    /// Bound exceeded; the state is now `Failed`
    Exhausted,
    /// The state was already terminal and was left untouched
    Terminal,
}

/// Splash state for the lifetime of one poll run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    /// Current state machine phase
    pub phase: PollPhase,
    /// Failed probes so far; never decremented
    pub attempts: u32,
    /// Human-readable phase description
    pub status: String,
    /// Progress estimate in `[0, 100]`
    pub percent: u8,
    /// Set exactly once, when the attempt bound is exceeded
    pub error: Option<String>,
}

impl PollState {
    /// Fresh state on mount or after a manual restart
    #[must_use]
    pub fn initial() -> Self {
        Self {
            phase: PollPhase::Running,
            attempts: 0,
            status: status::INITIAL.to_string(),
            percent: 0,
            error: None,
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self.phase, PollPhase::Running)
    }

    /// Record an acknowledged probe. Returns `false` if the state was already terminal.
    pub fn mark_synced(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.phase = PollPhase::Succeeded;
        self.percent = 100;
        self.status = status::SYNCED.to_string();
        true
    }

    /// Fold one failed probe into the state.
    ///
    /// Past `max_attempts` failures the state becomes `Failed` and keeps its
    /// last percent; otherwise percent and status are recomputed from the new
    /// attempt count.
    pub fn record_failure(&mut self, max_attempts: u32) -> FailureDisposition {
        if self.is_terminal() {
            return FailureDisposition::Terminal;
        }

        self.attempts = self.attempts.saturating_add(1);

        if self.attempts > max_attempts {
            self.phase = PollPhase::Failed;
            self.error = Some(status::BACKEND_UNRESPONSIVE.to_string());
            self.status = status::LINK_FAILURE.to_string();
            return FailureDisposition::Exhausted;
        }

        self.percent = percent_for_attempts(self.attempts, max_attempts);
        self.status = status_label_for_attempts(self.attempts).to_string();
        FailureDisposition::Retry
    }
}

impl Default for PollState {
    fn default() -> Self {
        Self::initial()
    }
}

/// `min(95, ceil(100 * attempts / max_attempts))`
#[must_use]
pub fn percent_for_attempts(attempts: u32, max_attempts: u32) -> u8 {
    let cap = polling::RETRY_PERCENT_CAP;
    if max_attempts == 0 {
        return cap;
    }
    let raw = (u64::from(attempts) * 100).div_ceil(u64::from(max_attempts));
    u8::try_from(raw.min(u64::from(cap))).unwrap_or(cap)
}

/// Rotating status label for a given failure count
#[must_use]
pub fn status_label_for_attempts(attempts: u32) -> &'static str {
    let labels = &status::PHASE_LABELS;
    labels[attempts as usize % labels.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    const MAX: u32 = polling::MAX_ATTEMPTS;

    #[test]
    fn initial_state_matches_mount_values() {
        let state = PollState::initial();
        assert_eq!(state.phase, PollPhase::Running);
        assert_eq!(state.attempts, 0);
        assert_eq!(state.percent, 0);
        assert_eq!(state.status, "Initializing Core Services");
        assert!(state.error.is_none());
        assert_eq!(state, PollState::default());
    }

    #[rstest]
    #[case(PollPhase::Running, "RUNNING")]
    #[case(PollPhase::Succeeded, "SUCCEEDED")]
    #[case(PollPhase::Failed, "FAILED")]
    fn phase_displays_as_state_machine_name(#[case] phase: PollPhase, #[case] expected: &str) {
        assert_eq!(phase.to_string(), expected);
    }

    #[rstest]
    #[case(0, "Synchronizing Neural Pathways")]
    #[case(1, "Establishing Secure Uplink")]
    #[case(2, "Calibrating Task Priorities")]
    #[case(3, "Syncing with Notion Matrix")]
    #[case(4, "Powering Up Intelligence Engine")]
    #[case(5, "Synchronizing Neural Pathways")]
    #[case(80, "Synchronizing Neural Pathways")]
    fn label_rotates_with_attempts(#[case] attempts: u32, #[case] expected: &str) {
        assert_eq!(status_label_for_attempts(attempts), expected);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 2)]
    #[case(2, 3)]
    #[case(3, 4)]
    #[case(40, 50)]
    #[case(76, 95)]
    #[case(79, 95)]
    #[case(80, 95)]
    fn percent_uses_ceiling_and_cap(#[case] attempts: u32, #[case] expected: u8) {
        assert_eq!(percent_for_attempts(attempts, MAX), expected);
    }

    #[test]
    fn three_failures_produce_expected_percent_sequence() {
        let mut state = PollState::initial();
        let mut seen = vec![state.percent];
        for _ in 0..3 {
            assert_eq!(state.record_failure(MAX), FailureDisposition::Retry);
            seen.push(state.percent);
        }
        assert_eq!(seen, vec![0, 2, 3, 4]);

        assert!(state.mark_synced());
        assert_eq!(state.percent, 100);
        assert_eq!(state.status, "Matrix Synced");
        assert_eq!(state.phase, PollPhase::Succeeded);
    }

    #[test]
    fn error_appears_exactly_at_attempt_81() {
        let mut state = PollState::initial();
        for attempt in 1..=MAX {
            assert_eq!(state.record_failure(MAX), FailureDisposition::Retry);
            assert_eq!(state.attempts, attempt);
            assert!(state.error.is_none(), "error set early at attempt {attempt}");
            assert!(state.percent < 100);
        }

        assert_eq!(state.record_failure(MAX), FailureDisposition::Exhausted);
        assert_eq!(state.attempts, MAX + 1);
        assert_eq!(state.phase, PollPhase::Failed);
        assert_eq!(state.error.as_deref(), Some("Connection Timeout: Backend Unresponsive"));
        assert_eq!(state.status, "System Link Failure");
        assert_eq!(state.percent, 95);
    }

    #[test]
    fn terminal_state_is_frozen() {
        let mut failed = PollState::initial();
        for _ in 0..=MAX {
            failed.record_failure(MAX);
        }
        let snapshot = failed.clone();
        assert_eq!(failed.record_failure(MAX), FailureDisposition::Terminal);
        assert!(!failed.mark_synced());
        assert_eq!(failed, snapshot);

        let mut synced = PollState::initial();
        assert!(synced.mark_synced());
        let snapshot = synced.clone();
        assert_eq!(synced.record_failure(MAX), FailureDisposition::Terminal);
        assert_eq!(synced, snapshot);
    }

    proptest! {
        #[test]
        fn percent_formula_holds_while_retrying(attempts in 0u32..=MAX) {
            let expected = std::cmp::min(95, (100 * attempts).div_ceil(MAX));
            prop_assert_eq!(u32::from(percent_for_attempts(attempts, MAX)), expected);
            prop_assert!(percent_for_attempts(attempts, MAX) < 100);
        }

        #[test]
        fn percent_is_monotonic(a in 0u32..=MAX, b in 0u32..=MAX) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(percent_for_attempts(lo, MAX) <= percent_for_attempts(hi, MAX));
        }

        #[test]
        fn replayed_failures_match_pure_functions(failures in 1u32..=MAX) {
            let mut state = PollState::initial();
            for _ in 0..failures {
                state.record_failure(MAX);
            }
            prop_assert_eq!(state.percent, percent_for_attempts(failures, MAX));
            prop_assert_eq!(state.status.as_str(), status_label_for_attempts(failures));
            prop_assert!(state.error.is_none());
        }
    }
}
