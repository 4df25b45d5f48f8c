//! Cooldown flag for the local cache service.
//!
//! After a failed probe the service is considered offline and probes are
//! skipped until the cooldown has elapsed. The next successful probe clears
//! the flag. Races between callers at worst cost one extra probe.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Skips probes to an unreachable service for a cooldown window.
#[derive(Debug)]
pub struct CooldownBreaker {
    cooldown: Duration,
    tripped_at: Mutex<Option<Instant>>,
}

impl CooldownBreaker {
    /// Create a closed breaker.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            tripped_at: Mutex::new(None),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.tripped_at.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether a probe should be attempted now.
    pub fn allows_probe(&self) -> bool {
        match *self.state() {
            Some(tripped_at) => tripped_at.elapsed() >= self.cooldown,
            None => true,
        }
    }

    /// Whether the service is currently flagged offline.
    pub fn is_tripped(&self) -> bool {
        self.state().is_some()
    }

    /// Record a failed probe; restarts the cooldown.
    pub fn record_failure(&self) {
        let mut state = self.state();
        if state.is_none() {
            tracing::info!("Cache service unreachable, skipping it for {:?}", self.cooldown);
        }
        *state = Some(Instant::now());
    }

    /// Record a successful probe.
    pub fn record_success(&self) {
        let mut state = self.state();
        if state.take().is_some() {
            tracing::info!("Cache service back online");
        }
    }

    /// Clear the flag.
    pub fn reset(&self) {
        *self.state() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_window() {
        let breaker = CooldownBreaker::new(Duration::from_secs(30));
        assert!(breaker.allows_probe());

        breaker.record_failure();
        assert!(breaker.is_tripped());
        assert!(!breaker.allows_probe());

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(!breaker.allows_probe());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(breaker.allows_probe());
        assert!(breaker.is_tripped());

        breaker.record_success();
        assert!(!breaker.is_tripped());
        assert!(breaker.allows_probe());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_restarts_cooldown() {
        let breaker = CooldownBreaker::new(Duration::from_secs(30));
        breaker.record_failure();
        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(breaker.allows_probe());

        breaker.record_failure();
        assert!(!breaker.allows_probe());

        breaker.reset();
        assert!(breaker.allows_probe());
    }
}
