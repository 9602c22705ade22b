use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:14243";
pub const DEFAULT_AUTH_TOKEN: &str = "helloworld";

/// Runtime configuration, resolved from the environment and an optional `.env`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Mem server base URL (MEM_API_URL)
    pub api_url: String,

    /// Bearer token sent with every request (MEM_AUTH_TOKEN)
    pub auth_token: String,

    /// Project whose session is saved (--project-path, PROJECT_PATH, or cwd)
    pub project_path: PathBuf,

    /// Keep at most this many recent messages; 0 means unlimited (MAX_MESSAGES)
    pub max_messages: usize,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn load_dotenv(dotenv_path: Option<&Path>) {
    // Existing environment variables always win over .env entries.
    let loaded = match dotenv_path {
        Some(path) => dotenvy::from_path(path).map(|_| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "ignoring unreadable .env"),
    }
}

fn parse_max_messages(raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .with_context(|| format!("invalid MAX_MESSAGES {raw:?}: expected a non-negative integer"))
}

impl Config {
    /// Load config from the environment.
    ///
    /// `.env` is read first without overriding variables that are already
    /// set: `dotenv_path` when given, otherwise the nearest `.env` in the
    /// current directory or its parents. The project path comes from
    /// `project_path`, then `PROJECT_PATH`, then the current directory.
    pub fn load(project_path: Option<PathBuf>, dotenv_path: Option<&Path>) -> Result<Self> {
        load_dotenv(dotenv_path);

        let project_path = match project_path {
            Some(path) => path,
            None => match std::env::var_os("PROJECT_PATH").filter(|p| !p.is_empty()) {
                Some(path) => PathBuf::from(path),
                None => std::env::current_dir().context("unable to resolve current directory")?,
            },
        };

        let max_messages = match std::env::var("MAX_MESSAGES") {
            Ok(raw) => parse_max_messages(&raw)?,
            Err(_) => 0,
        };

        Ok(Self {
            api_url: env_or("MEM_API_URL", DEFAULT_API_URL),
            auth_token: env_or("MEM_AUTH_TOKEN", DEFAULT_AUTH_TOKEN),
            project_path,
            max_messages,
        })
    }
}
