//! Thread payload: packaging parsed messages for the Mem `/threads` API.

use serde::Serialize;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::session::{Message, Role, resolve_project_path, truncate};

/// Where the conversation came from
pub const SOURCE: &str = "claude-code";

/// Tag recorded in metadata so the server knows which client persisted it
pub const PERSIST_METHOD: &str = "mem_persist_cli";

/// Longest auto-generated title, in characters (before the "..." suffix)
pub const TITLE_MAX_CHARS: usize = 80;

const PARTICIPANTS: [&str; 2] = ["user", "claude"];

/// Request body for `POST /threads`
#[derive(Debug, Clone, Serialize)]
pub struct ThreadPayload {
    pub thread_id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub participants: Vec<String>,
    pub source: String,
    pub project: String,
    pub workspace: String,
    pub import_date: String,
    pub metadata: ThreadMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreadMetadata {
    pub session_file: String,
    pub total_lines_in_file: usize,
    pub messages_extracted: usize,
    pub persist_method: String,
}

/// Inputs for building a thread payload
#[derive(Debug)]
pub struct ThreadRequest<'a> {
    pub messages: Vec<Message>,
    pub project_path: &'a Path,
    pub session_file: &'a Path,
    /// Used verbatim when non-empty
    pub custom_title: Option<&'a str>,
    pub total_lines: usize,
}

/// Current local time, or UTC when the local offset cannot be determined
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn compact_stamp(now: OffsetDateTime) -> String {
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

fn display_stamp(now: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute()
    )
}

/// Pick a thread title: custom, else the first user message, else a dated default
pub fn thread_title(custom_title: Option<&str>, messages: &[Message], now: OffsetDateTime) -> String {
    if let Some(title) = custom_title.filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    match messages.iter().find(|m| m.role == Role::User) {
        Some(first_user) => truncate(&first_user.content, TITLE_MAX_CHARS),
        None => format!("Claude Code Session - {}", display_stamp(now)),
    }
}

/// Name of the project directory, after resolving the path
pub fn project_name(project_path: &Path) -> String {
    resolve_project_path(project_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Build the thread payload using the current local time
pub fn build_thread_request(request: ThreadRequest<'_>) -> ThreadPayload {
    build_thread_request_at(request, local_now())
}

/// Build the thread payload as of `now` (local time)
pub fn build_thread_request_at(request: ThreadRequest<'_>, now: OffsetDateTime) -> ThreadPayload {
    let workspace = resolve_project_path(request.project_path);
    let project = project_name(&workspace);

    let utc_now = now.to_offset(UtcOffset::UTC);
    let import_date = utc_now
        .format(&Rfc3339)
        .unwrap_or_else(|_| utc_now.unix_timestamp().to_string());

    let session_file = request
        .session_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    ThreadPayload {
        thread_id: format!("{project}_{}", compact_stamp(now)),
        title: thread_title(request.custom_title, &request.messages, now),
        participants: PARTICIPANTS.iter().map(|p| p.to_string()).collect(),
        source: SOURCE.to_string(),
        project,
        workspace: workspace.to_string_lossy().into_owned(),
        import_date,
        metadata: ThreadMetadata {
            session_file,
            total_lines_in_file: request.total_lines,
            messages_extracted: request.messages.len(),
            persist_method: PERSIST_METHOD.to_string(),
        },
        messages: request.messages,
    }
}
