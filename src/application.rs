//! Application layer module
//!
//! This module holds the readiness poller state machine, the session that
//! owns it for the lifetime of the splash screen, and the ports (traits) the
//! infrastructure layer implements.

pub mod error;
pub mod ports;
pub mod readiness_poller;
pub mod splash_session;

pub use error::SplashError;
pub use ports::{Navigator, ProbeFailure, ProbeOutcome, ReadinessProbe};
pub use readiness_poller::{PollOutcome, PollerSettings, ReadinessPoller};
pub use splash_session::{SessionOutcome, SplashSession};
