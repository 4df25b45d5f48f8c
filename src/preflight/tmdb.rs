//! TMDB API preflight check.

use super::CheckResult;
use crate::services::tmdb::TmdbClient;
use crate::services::transport::TransportError;

/// Check every configured TMDB host.
pub async fn check(client: &TmdbClient) -> Vec<CheckResult> {
    let mut results = Vec::new();

    for host in client.hosts() {
        let name = format!("TMDB {}", host);
        let result = match client.ping_host(host).await {
            Ok(()) => CheckResult::ok(&name, "connected"),
            Err(TransportError::Status(401)) => CheckResult::fail(
                &name,
                "invalid API key",
                "Check your TMDB_API_KEY environment variable",
            ),
            Err(e) => CheckResult::fail(
                &name,
                &format!("connection failed: {}", e),
                "Check your network connection; the other host may still work",
            ),
        };
        results.push(result);
    }

    results
}
