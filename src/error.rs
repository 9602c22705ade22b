//! Error types for session discovery and the Mem API client.
//!
//! Both are surfaced to the user at the command boundary; everything else
//! travels as `anyhow::Error`.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while locating the Claude Code session log for a project.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The encoded project folder does not exist under `~/.claude/projects`.
    #[error(
        "Session directory not found: {}\nExpected encoding for: {}\nMake sure Claude Code has created sessions for this project.",
        .session_dir.display(),
        .project_path.display()
    )]
    DirectoryNotFound {
        session_dir: PathBuf,
        project_path: PathBuf,
    },

    /// The session directory holds no eligible `*.jsonl` file.
    #[error("No session files found in {}", .0.display())]
    NoSessionFiles(PathBuf),

    #[error("HOME not set")]
    HomeNotSet,

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Uniform failure of a Mem API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with something other than 200/201.
    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// HTTP status of the response, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
