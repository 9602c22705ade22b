//! Save Claude Code conversation threads to a Nowledge Mem server.
//!
//! The pipeline is discover → parse → package → upload:
//! [`session`] finds and parses the newest session log for a project,
//! [`payload`] turns the messages into a thread request, and [`api`]
//! posts it. [`diagnostics`] checks each stage independently.

pub mod api;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod payload;
pub mod save;
pub mod session;

#[cfg(test)]
mod test_utils;

pub use api::{ApiClient, ThreadSummary};
pub use config::Config;
pub use diagnostics::run_diagnostics;
pub use error::{ApiError, SessionError};
pub use payload::{ThreadPayload, ThreadRequest, build_thread_request};
pub use save::{SaveOptions, SaveOutcome, save};
