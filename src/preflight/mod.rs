//! Preflight checks module.

mod cache_service;
mod tmdb;

use crate::services::tmdb::TmdbClient;
use colored::Colorize;

/// Result of a preflight check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl CheckResult {
    pub fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn fail(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Run all preflight checks.
///
/// `client` is `None` when it could not be built (e.g. no API key); the
/// failure reason is reported in its place.
pub async fn run_preflight_checks(client: Option<&TmdbClient>, client_error: Option<&str>) -> Vec<CheckResult> {
    let mut results = Vec::new();

    match client {
        Some(client) => {
            results.extend(tmdb::check(client).await);
            results.push(cache_service::check(client).await);
        }
        None => results.push(CheckResult::fail(
            "TMDB API",
            client_error.unwrap_or("client not configured"),
            "Set TMDB_API_KEY environment variable",
        )),
    }

    results
}

/// Print preflight check results.
pub fn print_results(results: &[CheckResult]) {
    for result in results {
        if result.success {
            println!(
                "{} {}: {}",
                "[OK]".green(),
                result.name.bold(),
                result.message
            );
        } else {
            println!(
                "{} {}: {}",
                "[FAIL]".red(),
                result.name.bold(),
                result.message
            );
            if let Some(ref hint) = result.hint {
                println!("  {} {}", "->".yellow(), hint);
            }
        }
    }
}

/// Check if all preflight checks passed.
pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.success)
}
