//! Presentation layer
//!
//! `splash_view` maps a [`crate::domain::PollState`] snapshot to what the
//! screen shows; `terminal` draws it and collects the retry request.

pub mod splash_view;
pub mod terminal;

pub use splash_view::SplashView;
pub use terminal::{TerminalPresenter, spawn_retry_input};
