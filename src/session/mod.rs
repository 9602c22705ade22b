//! Claude Code session handling: discovery, parsing, and types.

mod discovery;
mod parser;
mod types;

pub use discovery::{
    claude_projects_dir, encode_project_dir_name, find_latest_session, find_session_directory,
    list_session_files, resolve_project_path,
};
pub use parser::{
    MAX_CONTENT_CHARS, MIN_CONTENT_CHARS, parse_session, parse_session_file, strip_control_chars,
    truncate,
};
pub use types::{Message, ParseResult, Role, SessionFile};
