//! Shared test utilities.
//!
//! All tests that manipulate environment variables (HOME, MEM_*) must hold
//! `env_lock()` for their whole duration.

use filetime::FileTime;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Global lock for tests that modify environment variables.
pub fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

/// RAII guard that restores an environment variable on drop.
pub struct EnvGuard {
    key: String,
    old: Option<String>,
}

impl EnvGuard {
    pub fn set(key: &str, value: &str) -> Self {
        let guard = Self::capture(key);
        unsafe {
            std::env::set_var(key, value);
        }
        guard
    }

    pub fn unset(key: &str) -> Self {
        let guard = Self::capture(key);
        unsafe {
            std::env::remove_var(key);
        }
        guard
    }

    fn capture(key: &str) -> Self {
        Self {
            key: key.to_string(),
            old: std::env::var(key).ok(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.old {
            Some(val) => unsafe { std::env::set_var(&self.key, val) },
            None => unsafe { std::env::remove_var(&self.key) },
        }
    }
}

/// A temp directory laid out like a home with an empty `.claude/projects`.
pub fn fake_home() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join(".claude").join("projects")).unwrap();
    tmp
}

/// Create (or truncate) a file and backdate its mtime by `secs_ago` seconds.
pub fn touch_with_age(path: &Path, secs_ago: u64) {
    fs::write(path, "").unwrap();
    let when = SystemTime::now() - Duration::from_secs(secs_ago);
    filetime::set_file_mtime(path, FileTime::from_system_time(when)).unwrap();
}

/// Write JSONL records, one per line.
pub fn write_jsonl(path: &Path, lines: &[&str]) {
    let mut body = lines.join("\n");
    body.push('\n');
    fs::write(path, body).unwrap();
}
