//! Cache service preflight check.
//!
//! The cache service only speeds things up, so this check never fails.

use super::CheckResult;
use crate::services::tmdb::TmdbClient;

/// Report whether the local cache service answers.
pub async fn check(client: &TmdbClient) -> CheckResult {
    if client.ping_cache_service().await {
        CheckResult::ok("Cache service", "available")
    } else {
        CheckResult::ok("Cache service", "offline, using direct TMDB requests")
    }
}
