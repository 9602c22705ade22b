//! Diagnose command - check API reachability and session discovery.
//!
//! Each check is evaluated independently into a [`CheckResult`] so that one
//! failure never hides the others; rendering happens afterwards.

use crate::api::ApiClient;
use crate::config::Config;
use crate::output;
use crate::session::{find_session_directory, list_session_files};

/// Result of a single diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub message: String,
    /// Extra information printed after the status line.
    pub detail: Option<String>,
}

impl CheckResult {
    fn pass(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            message: message.into(),
            detail: None,
        }
    }

    fn fail(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            message: message.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

fn check_api(client: &ApiClient) -> CheckResult {
    if client.health_check() {
        CheckResult::pass("api", "API is reachable and healthy")
    } else {
        CheckResult::fail("api", "API health check failed")
    }
}

/// Second health probe; the health endpoint also receives the bearer token.
fn check_auth(client: &ApiClient) -> CheckResult {
    if client.health_check() {
        CheckResult::pass("auth", "Authentication successful")
    } else {
        CheckResult::fail("auth", "Authentication may have failed")
    }
}

fn check_project(config: &Config) -> Vec<CheckResult> {
    if !config.project_path.is_dir() {
        return vec![CheckResult::fail("project", "Project directory does not exist")];
    }

    let mut results = vec![CheckResult::pass("project", "Project directory exists")];
    match find_session_directory(&config.project_path) {
        Ok(session_dir) => {
            let count = list_session_files(&session_dir)
                .map(|files| files.len())
                .unwrap_or(0);
            results.push(
                CheckResult::pass(
                    "sessions",
                    format!("Session directory found: {}", session_dir.display()),
                )
                .with_detail(format!("Found {count} session file(s)")),
            );
        }
        Err(err) => {
            results.push(CheckResult::fail(
                "sessions",
                format!("Session directory not found: {err}"),
            ));
        }
    }
    results
}

/// Evaluate every check without printing anything.
pub fn collect_checks(config: &Config, client: &ApiClient) -> Vec<CheckResult> {
    let mut results = vec![check_api(client), check_auth(client)];
    results.extend(check_project(config));
    results
}

fn print_results(results: &[CheckResult], names: &[&str]) {
    for result in results.iter().filter(|r| names.contains(&r.name)) {
        println!("{}", output::status(&result.message, result.passed));
        if let Some(detail) = &result.detail {
            println!("{}", output::info(detail));
        }
    }
}

/// Run all checks, print a report, and return whether everything passed.
pub fn run_diagnostics(config: &Config) -> bool {
    let client = ApiClient::new(&config.api_url, &config.auth_token);

    println!("\n{}\n", output::heading("mem-persist Diagnostics"));
    println!("Checking API connectivity: {}", config.api_url);
    let results = collect_checks(config, &client);
    print_results(&results, &["api"]);

    println!("\nChecking authentication...");
    print_results(&results, &["auth"]);

    println!("\nChecking project: {}", config.project_path.display());
    print_results(&results, &["project", "sessions"]);

    println!("\nChecking runtime...");
    println!(
        "{}",
        output::info(&format!("mem-persist {}", env!("CARGO_PKG_VERSION")))
    );

    let all_passed = results.iter().all(|r| r.passed);
    println!("\n{}\n", output::heading("Summary"));
    if all_passed {
        println!("{}", output::success("✓ All checks passed!"));
        println!("\nYou can now run: mem-persist save");
    } else {
        println!("{}", output::failure("✗ Some checks failed"));
        println!("\nPlease fix the issues above before proceeding.");
    }
    all_passed
}
