//! Types for session discovery and parsing.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Map a log record's `type` field to a role; other record types have none.
    pub fn from_record_type(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// A cleaned conversation turn, in the shape the Mem API expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: Option<String>,
}

/// A candidate session log inside a project's session directory
#[derive(Debug, Clone)]
pub struct SessionFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Result of parsing a session log
#[derive(Debug, Default)]
pub struct ParseResult {
    pub messages: Vec<Message>,
    /// Every line in the file, including skipped ones
    pub total_lines: usize,
}
