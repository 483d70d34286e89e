//! Fixed constants for the splash screen
//!
//! The backend address, probe cadence and display strings are fixed. The
//! configuration layer only exposes them so tests and local setups can
//! shrink the timings; the defaults below are the production values.

/// Backend endpoint constants
pub mod backend {
    /// Root URL of the local backend; the success handoff navigates here
    pub const BASE_URL: &str = "http://localhost:8000";

    /// Readiness endpoint path, resolved against [`BASE_URL`]
    pub const STATUS_PATH: &str = "/api/setup/status";

    /// Per-probe request timeout (milliseconds)
    pub const REQUEST_TIMEOUT_MS: u64 = 3000;
}

/// Probe loop timing and bounds
pub mod polling {
    /// Maximum number of failed probes tolerated before terminal failure
    pub const MAX_ATTEMPTS: u32 = 80;

    /// Pause between consecutive probes while retrying (milliseconds)
    pub const INTER_PROBE_DELAY_MS: u64 = 1200;

    /// Pause between success detection and navigation handoff (milliseconds)
    pub const SETTLE_DELAY_MS: u64 = 800;

    /// Highest percent shown while still retrying; 100 is reserved for success
    pub const RETRY_PERCENT_CAP: u8 = 95;
}

/// Status and error strings shown by the splash
pub mod status {
    /// Status before the first probe resolves
    pub const INITIAL: &str = "Initializing Core Services";

    /// Status once the backend acknowledged the probe
    pub const SYNCED: &str = "Matrix Synced";

    /// Status once the attempt bound is exceeded
    pub const LINK_FAILURE: &str = "System Link Failure";

    /// Error text surfaced once the attempt bound is exceeded
    pub const BACKEND_UNRESPONSIVE: &str = "Connection Timeout: Backend Unresponsive";

    /// Rotating labels while retrying, indexed by `attempts % len`
    pub const PHASE_LABELS: [&str; 5] = [
        "Synchronizing Neural Pathways",
        "Establishing Secure Uplink",
        "Calibrating Task Priorities",
        "Syncing with Notion Matrix",
        "Powering Up Intelligence Engine",
    ];
}
