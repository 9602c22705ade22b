//! Session discovery: mapping a project path to Claude Code's session folder
//! and picking the latest log in it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

use super::types::SessionFile;
use crate::error::SessionError;

/// Prefix of sub-agent session logs, which are never selected.
const AGENT_PREFIX: &str = "agent-";

/// Get Claude Code's projects directory (`~/.claude/projects`)
pub fn claude_projects_dir() -> Result<PathBuf, SessionError> {
    let home = std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .ok_or(SessionError::HomeNotSet)?;
    Ok(PathBuf::from(home).join(".claude").join("projects"))
}

/// Encode an absolute project path to Claude's project folder name format.
/// Rules: /. -> -- (hidden dirs), / -> -, then exactly one leading -
pub fn encode_project_dir_name(path: &str) -> String {
    let encoded = path.replace("/.", "--").replace('/', "-");
    format!("-{}", encoded.trim_start_matches('-'))
}

/// Canonicalize a project path, falling back to the plain absolute form when
/// it does not exist on disk.
pub fn resolve_project_path(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Find the session directory Claude Code keeps for a project
pub fn find_session_directory(project_path: &Path) -> Result<PathBuf, SessionError> {
    let abs_path = resolve_project_path(project_path);
    let folder_name = encode_project_dir_name(&abs_path.to_string_lossy());
    let session_dir = claude_projects_dir()?.join(folder_name);
    debug!(project = %abs_path.display(), dir = %session_dir.display(), "resolved session directory");

    if !session_dir.is_dir() {
        return Err(SessionError::DirectoryNotFound {
            session_dir,
            project_path: abs_path,
        });
    }
    Ok(session_dir)
}

/// List eligible session logs (`*.jsonl`, not `agent-*`) directly inside a
/// session directory, in enumeration order.
pub fn list_session_files(session_dir: &Path) -> Result<Vec<SessionFile>, SessionError> {
    let io_err = |source| SessionError::Io {
        path: session_dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(session_dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("jsonl") {
            continue;
        }
        let is_agent = path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name.starts_with(AGENT_PREFIX));
        if is_agent {
            continue;
        }
        // Follows symlinks so a linked log reports its target's type and mtime.
        let meta = match fs::metadata(&path) {
            Ok(meta) => meta,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable session file");
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(UNIX_EPOCH);
        files.push(SessionFile { path, modified });
    }
    Ok(files)
}

/// Find the most recently modified session log in a session directory
pub fn find_latest_session(session_dir: &Path) -> Result<PathBuf, SessionError> {
    let mut best: Option<SessionFile> = None;
    for file in list_session_files(session_dir)? {
        let dominated = match best.as_ref() {
            Some(current) => file.modified <= current.modified,
            None => false,
        };
        if !dominated {
            best = Some(file);
        }
    }

    let Some(latest) = best else {
        return Err(SessionError::NoSessionFiles(session_dir.to_path_buf()));
    };
    debug!(path = %latest.path.display(), "selected latest session file");
    Ok(latest.path)
}
