//! Session parsing: turning a Claude Code JSONL log into clean messages.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use super::types::{Message, ParseResult, Role};

/// Longest message content kept, in characters
pub const MAX_CONTENT_CHARS: usize = 15_000;

/// Extracted text must be longer than this to count as a message
pub const MIN_CONTENT_CHARS: usize = 5;

/// Truncate a string to max_chars, adding "..." if truncated
pub fn truncate(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let mut out: String = input.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

fn is_stripped_control(ch: char) -> bool {
    matches!(
        ch,
        '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}'
    )
}

/// Remove ASCII control characters, keeping tab, newline and carriage return
pub fn strip_control_chars(input: &str) -> String {
    input.chars().filter(|ch| !is_stripped_control(*ch)).collect()
}

/// Pull the text out of a record's `message` field.
fn extract_content(message: &Value) -> String {
    match message {
        Value::String(text) => text.clone(),
        Value::Object(map) => match map.get("content") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Array(blocks)) => blocks
                .iter()
                .filter(|block| block.get("type").and_then(|v| v.as_str()) == Some("text"))
                .filter_map(|block| block.get("text").and_then(|v| v.as_str()))
                .collect(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Convert one decoded log record into a message, if it is a real turn
fn message_from_record(value: &Value) -> Option<Message> {
    let role = value
        .get("type")
        .and_then(|v| v.as_str())
        .and_then(Role::from_record_type)?;

    let content = value.get("message").map(extract_content).unwrap_or_default();
    if content.chars().count() <= MIN_CONTENT_CHARS {
        return None;
    }

    let truncated: String = content.chars().take(MAX_CONTENT_CHARS).collect();
    let content = strip_control_chars(&truncated);
    if content.is_empty() {
        return None;
    }
    Some(Message {
        role,
        content,
        timestamp: value
            .get("timestamp")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
    })
}

/// Parse session log lines from any buffered reader.
///
/// Lines that are not valid JSON are skipped. With a positive
/// `max_messages`, collection stops at twice the cap and only the last
/// `max_messages` collected are returned.
pub fn parse_session<R: BufRead>(reader: R, max_messages: usize) -> std::io::Result<ParseResult> {
    let mut result = ParseResult::default();
    let collect_limit = max_messages.saturating_mul(2);

    for line in reader.split(b'\n') {
        let line = line?;
        result.total_lines += 1;

        if max_messages > 0 && result.messages.len() >= collect_limit {
            continue;
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let value: Value = match serde_json::from_slice(&line) {
            Ok(v) => v,
            Err(err) => {
                debug!(line = result.total_lines, error = %err, "skipping malformed line");
                continue;
            }
        };
        if let Some(message) = message_from_record(&value) {
            result.messages.push(message);
        }
    }

    if max_messages > 0 && result.messages.len() > max_messages {
        let excess = result.messages.len() - max_messages;
        result.messages.drain(..excess);
    }
    Ok(result)
}

/// Parse a session log file into messages and its total line count
pub fn parse_session_file(path: &Path, max_messages: usize) -> Result<ParseResult> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let result = parse_session(BufReader::new(file), max_messages)
        .with_context(|| format!("failed to read {}", path.display()))?;
    debug!(
        path = %path.display(),
        messages = result.messages.len(),
        lines = result.total_lines,
        "parsed session"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_jsonl;
    use std::fs;
    use tempfile::TempDir;

    fn user_line(text: &str) -> String {
        serde_json::json!({
            "type": "user",
            "message": {"role": "user", "content": text},
            "timestamp": "2025-01-01T00:00:00Z",
        })
        .to_string()
    }

    fn assistant_line(text: &str) -> String {
        serde_json::json!({
            "type": "assistant",
            "message": {"role": "assistant", "content": [{"type": "text", "text": text}]},
        })
        .to_string()
    }

    fn parse_lines(lines: &[String], max_messages: usize) -> ParseResult {
        let body = lines.join("\n");
        parse_session(body.as_bytes(), max_messages).unwrap()
    }

    // ===== truncate tests =====

    #[test]
    fn test_truncate_short() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_exact() {
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(truncate("hello world", 5), "hello...");
    }

    #[test]
    fn test_truncate_unicode() {
        // Truncate by character count, not bytes
        assert_eq!(truncate("日本語テスト", 3), "日本語...");
    }

    // ===== strip_control_chars tests =====

    #[test]
    fn strips_control_characters_but_keeps_whitespace() {
        let input = "a\u{0}b\u{7}c\td\ne\rf\u{B}\u{C}g\u{1B}[0mh\u{7F}";
        assert_eq!(strip_control_chars(input), "abc\td\ne\rfg[0mh");
    }

    #[test]
    fn stripping_is_idempotent() {
        let inputs = ["plain", "x\u{1}y\u{1F}z", "\u{0}\u{0}", "tab\tnew\nline", ""];
        for input in inputs {
            let once = strip_control_chars(input);
            assert_eq!(strip_control_chars(&once), once);
        }
    }

    #[test]
    fn keeps_non_ascii_text() {
        assert_eq!(strip_control_chars("héllo 🌍 \u{85}"), "héllo 🌍 \u{85}");
    }

    // ===== content extraction tests =====

    #[test]
    fn extracts_string_content() {
        let result = parse_lines(&[user_line("Fix the login bug")], 0);
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].role, Role::User);
        assert_eq!(result.messages[0].content, "Fix the login bug");
        assert_eq!(
            result.messages[0].timestamp.as_deref(),
            Some("2025-01-01T00:00:00Z")
        );
    }

    #[test]
    fn concatenates_text_blocks_and_skips_others() {
        let line = r#"{"type":"assistant","message":{"content":[{"type":"text","text":"First part. "},{"type":"tool_use","name":"Read","input":{}},{"type":"thinking","thinking":"hmm"},{"type":"text","text":"Second part."}]}}"#;
        let result = parse_session(line.as_bytes(), 0).unwrap();
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].content, "First part. Second part.");
        assert_eq!(result.messages[0].timestamp, None);
    }

    #[test]
    fn message_given_as_plain_string() {
        let line = r#"{"type":"user","message":"a bare string message"}"#;
        let result = parse_session(line.as_bytes(), 0).unwrap();
        assert_eq!(result.messages[0].content, "a bare string message");
    }

    #[test]
    fn tool_result_only_turns_are_dropped() {
        let line = r#"{"type":"user","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"t1","content":"file contents here"}]}}"#;
        let result = parse_session(line.as_bytes(), 0).unwrap();
        assert!(result.messages.is_empty());
        assert_eq!(result.total_lines, 1);
    }

    #[test]
    fn skips_non_conversation_records() {
        let lines = vec![
            r#"{"type":"summary","summary":"A long summary of work"}"#.to_string(),
            r#"{"type":"system","message":{"content":"system prompt text"}}"#.to_string(),
            r#"{"type":"file-history-snapshot","snapshot":{}}"#.to_string(),
            user_line("Actual question here"),
        ];
        let result = parse_lines(&lines, 0);
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.total_lines, 4);
    }

    #[test]
    fn discards_short_content() {
        let lines = vec![user_line("ok"), user_line("12345"), user_line("123456")];
        let result = parse_lines(&lines, 0);
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].content, "123456");
    }

    #[test]
    fn short_content_counts_characters_not_bytes() {
        // Five characters, fifteen bytes.
        let result = parse_lines(&[user_line("日本語です")], 0);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn truncates_long_content() {
        let long = "x".repeat(MAX_CONTENT_CHARS + 500);
        let result = parse_lines(&[assistant_line(&long)], 0);
        assert_eq!(result.messages[0].content.chars().count(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn strips_control_characters_from_content() {
        let result = parse_lines(&[user_line("bell\u{7} and escape\u{1B}\ttab")], 0);
        assert_eq!(result.messages[0].content, "bell and escape\ttab");
    }

    #[test]
    fn control_only_content_is_dropped() {
        let lines = vec![
            user_line("\u{1}\u{2}\u{3}\u{4}\u{5}\u{6}\u{7}"),
            assistant_line("a real answer"),
        ];
        let result = parse_lines(&lines, 0);
        assert_eq!(result.total_lines, 2);
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].content, "a real answer");
        assert!(result.messages.iter().all(|m| !m.content.is_empty()));
    }

    // ===== resilience tests =====

    #[test]
    fn malformed_line_does_not_abort() {
        let lines = vec![
            user_line("first valid message"),
            assistant_line("second valid message"),
            "{not json at all".to_string(),
            user_line("third valid message"),
            assistant_line("fourth valid message"),
            user_line("fifth valid message"),
        ];
        let result = parse_lines(&lines, 0);
        assert_eq!(result.messages.len(), 5);
        assert_eq!(result.messages[2].content, "third valid message");
        assert_eq!(result.total_lines, 6);
    }

    #[test]
    fn invalid_utf8_line_is_skipped() {
        let mut body = user_line("before the bad line").into_bytes();
        body.push(b'\n');
        body.extend_from_slice(b"{\"type\":\"user\",\"message\":\"\xff\xfe broken\"}\n");
        body.extend_from_slice(user_line("after the bad line").as_bytes());

        let result = parse_session(body.as_slice(), 0).unwrap();
        assert_eq!(result.messages.len(), 2);
        assert_eq!(result.total_lines, 3);
    }

    #[test]
    fn blank_lines_are_counted_but_ignored() {
        let body = format!("{}\n\n   \n{}\n", user_line("hello there"), user_line("general kenobi"));
        let result = parse_session(body.as_bytes(), 0).unwrap();
        assert_eq!(result.messages.len(), 2);
        assert_eq!(result.total_lines, 4);
    }

    // ===== cap tests =====

    #[test]
    fn no_cap_keeps_every_message_in_order() {
        let lines: Vec<String> = (0..20)
            .map(|i| {
                if i % 2 == 0 {
                    user_line(&format!("user message {i}"))
                } else {
                    assistant_line(&format!("assistant message {i}"))
                }
            })
            .collect();
        let result = parse_lines(&lines, 0);
        assert_eq!(result.messages.len(), 20);
        for (i, msg) in result.messages.iter().enumerate() {
            assert!(msg.content.ends_with(&format!(" {i}")));
        }
    }

    #[test]
    fn cap_keeps_most_recent_collected_messages() {
        let lines: Vec<String> = (0..6).map(|i| user_line(&format!("message {i}"))).collect();
        let result = parse_lines(&lines, 4);
        let contents: Vec<&str> = result.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["message 2", "message 3", "message 4", "message 5"]);
    }

    #[test]
    fn cap_stops_collecting_at_twice_the_cap() {
        let lines: Vec<String> = (0..10).map(|i| user_line(&format!("message {i}"))).collect();
        let result = parse_lines(&lines, 2);
        let contents: Vec<&str> = result.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["message 2", "message 3"]);
        assert_eq!(result.total_lines, 10);
    }

    #[test]
    fn cap_never_exceeded() {
        let lines: Vec<String> = (0..7).map(|i| user_line(&format!("message {i}"))).collect();
        for cap in 1..10 {
            let result = parse_lines(&lines, cap);
            assert!(result.messages.len() <= cap);
            assert_eq!(result.messages.len(), cap.min(7));
        }
    }

    #[test]
    fn parse_session_file_reads_from_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("session.jsonl");
        let first = user_line("How do I add a route?");
        let second = assistant_line("Use Router::route with a handler.");
        write_jsonl(&path, &[&first, &second]);

        let result = parse_session_file(&path, 0).unwrap();
        assert_eq!(result.messages.len(), 2);
        assert_eq!(result.messages[1].role, Role::Assistant);
        assert_eq!(result.total_lines, 2);
    }

    #[test]
    fn parse_session_file_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        let err = parse_session_file(&tmp.path().join("gone.jsonl"), 0).unwrap_err();
        assert!(err.to_string().contains("failed to open"));
    }

    #[test]
    fn empty_file_has_no_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.jsonl");
        fs::write(&path, "").unwrap();
        let result = parse_session_file(&path, 0).unwrap();
        assert!(result.messages.is_empty());
        assert_eq!(result.total_lines, 0);
    }
}
