//! Console formatting helpers. Each returns a `String`; callers choose the stream.

use colored::Colorize;

const TAG: &str = "[mem-persist]";

/// `[mem-persist] <msg>` progress line
pub fn banner(msg: &str) -> String {
    format!("{} {msg}", TAG.blue())
}

/// `ℹ <msg>` info line
pub fn info(msg: &str) -> String {
    format!("{} {msg}", "ℹ".blue())
}

/// `✓ <msg>` or `✗ <msg>` check result
pub fn status(msg: &str, ok: bool) -> String {
    if ok {
        format!("{} {msg}", "✓".green())
    } else {
        format!("{} {msg}", "✗".red())
    }
}

/// `=== <title> ===` section heading
pub fn heading(title: &str) -> String {
    format!("=== {title} ===").blue().to_string()
}

pub fn success(msg: &str) -> String {
    msg.green().to_string()
}

pub fn failure(msg: &str) -> String {
    msg.red().to_string()
}

/// `✗ <label>: <detail>` for errors shown at the command boundary
pub fn error_line(label: &str, detail: &str) -> String {
    format!("{} {detail}", format!("✗ {label}:").red())
}
