//! Domain module - splash state and fixed constants
//!
//! This module contains the poll state entity and the pure functions that
//! derive progress and status text from it. Nothing here performs I/O.

pub mod constants;
pub mod poll_state;

// Re-export commonly used items for convenience
pub use poll_state::{FailureDisposition, PollPhase, PollState, percent_for_attempts, status_label_for_attempts};
