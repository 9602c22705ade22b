//! Save orchestration: locate, parse, package and upload the current session.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::api::{ApiClient, ThreadSummary};
use crate::config::Config;
use crate::output;
use crate::payload::{ThreadRequest, build_thread_request, project_name};
use crate::session::{find_latest_session, find_session_directory, parse_session_file};

/// Options for the save command
#[derive(Debug, Default)]
pub struct SaveOptions {
    /// Thread title; auto-generated when absent or empty
    pub title: Option<String>,
}

/// Result of a successful save
#[derive(Debug)]
pub struct SaveOutcome {
    pub session_file: PathBuf,
    pub messages_sent: usize,
    pub thread: ThreadSummary,
}

/// Run the save pipeline, printing progress to stdout
pub fn save(config: &Config, options: &SaveOptions) -> Result<SaveOutcome> {
    println!("{}\n", output::banner("🚀 Saving current session..."));

    let session_dir = find_session_directory(&config.project_path)?;
    let session_file = find_latest_session(&session_dir)?;

    let size_kb = fs::metadata(&session_file)
        .with_context(|| format!("failed to stat {}", session_file.display()))?
        .len() as f64
        / 1024.0;
    let file_name = session_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("{}", output::info(&format!("Project: {}", project_name(&config.project_path))));
    println!("{}", output::info(&format!("Session: {file_name} ({size_kb:.1} KB)")));

    if config.max_messages == 0 {
        println!("\n{}", output::banner("🔄 Parsing session (no limit)..."));
    } else {
        println!(
            "\n{}",
            output::banner(&format!(
                "🔄 Parsing session (max {} messages)...",
                config.max_messages
            ))
        );
    }
    let parsed = parse_session_file(&session_file, config.max_messages)?;
    println!(
        "{}",
        output::info(&format!(
            "Extracted {} messages from {} lines",
            parsed.messages.len(),
            parsed.total_lines
        ))
    );

    let messages_sent = parsed.messages.len();
    let payload = build_thread_request(ThreadRequest {
        messages: parsed.messages,
        project_path: &config.project_path,
        session_file: &session_file,
        custom_title: options.title.as_deref(),
        total_lines: parsed.total_lines,
    });
    println!("{}", output::info(&format!("Thread ID: {}", payload.thread_id)));
    let short_title: String = payload.title.chars().take(60).collect();
    println!("{}", output::info(&format!("Title: {short_title}")));

    println!("\n{}", output::banner("📤 Uploading to Nowledge Mem..."));
    let client = ApiClient::new(&config.api_url, &config.auth_token);
    let response = client.save_thread(&payload)?;
    let thread = ThreadSummary::from_response(&response);

    println!("\n{}\n", output::success("✅ Thread saved successfully!"));
    println!("{}", output::info(&format!("🆔 Thread ID: {}", thread.thread_id)));
    println!("{}", output::info(&format!("🔗 Server ID: {}", thread.id)));
    println!("{}", output::info(&format!("📊 Messages: {}", thread.message_count)));
    println!(
        "\n{}\n",
        output::banner("✨ Done! Conversation stored in Nowledge Mem.")
    );

    Ok(SaveOutcome {
        session_file,
        messages_sent,
        thread,
    })
}
