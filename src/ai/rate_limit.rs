//! Sliding-Window Rate Limiter
//!
//! Governs calls to the generation API with a fixed-size trailing window
//! (default: 10 calls / 60 seconds). Exhaustion is not an error: callers
//! suspend until the oldest recorded call ages out of the window.
//!
//! The limiter is explicitly constructed and injected into the pipeline
//! (no ambient global state). The window check-and-append runs inside a
//! single mutex-guarded critical section so concurrent callers cannot
//! race past the limit.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, trace};

use crate::constants::rate_limit as limits;
use crate::types::{DigestError, Result};

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum calls allowed inside one trailing window
    pub max_calls: u32,
    /// Trailing window duration
    pub window: Duration,
    /// Margin added to the computed wait before re-checking
    pub safety_margin: Duration,
    /// Optional cap on the total time `acquire` may suspend.
    /// `None` waits indefinitely, matching the original behavior.
    pub max_wait: Option<Duration>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: limits::DEFAULT_MAX_CALLS,
            window: Duration::from_secs(limits::DEFAULT_WINDOW_SECS),
            safety_margin: Duration::from_millis(limits::DEFAULT_SAFETY_MARGIN_MS),
            max_wait: None,
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_calls: u32, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            ..Default::default()
        }
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_calls == 0 {
            return Err(DigestError::Config(
                "rate_limit.max_calls must be at least 1".to_string(),
            ));
        }
        if self.window.is_zero() {
            return Err(DigestError::Config(
                "rate_limit.window must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Usage Stats
// =============================================================================

/// Snapshot of the current window, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageStats {
    /// Calls recorded inside the current window
    pub used: u32,
    /// `max(0, max_calls - used)`
    pub remaining: u32,
    /// Time until the oldest recorded call leaves the window
    pub reset_in: Option<Duration>,
}

// =============================================================================
// Rate Limiter
// =============================================================================

/// Shared limiter handle
pub type SharedRateLimiter = Arc<RateLimiter>;

/// Sliding-window request governor for one generation endpoint.
///
/// Timestamps are pruned lazily on each check; a recorded call reflects
/// API usage, not success, so `execute` records before invoking the
/// operation and keeps the record even when the operation fails.
pub struct RateLimiter {
    config: RateLimitConfig,
    calls: Mutex<VecDeque<Instant>>,
    total: AtomicU64,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            calls: Mutex::new(VecDeque::new()),
            total: AtomicU64::new(0),
        }
    }

    /// Create a shared limiter for injection into the pipeline
    pub fn shared(config: RateLimitConfig) -> SharedRateLimiter {
        Arc::new(Self::new(config))
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Non-blocking check: is a slot currently free?
    pub async fn can_proceed(&self) -> bool {
        let mut calls = self.calls.lock().await;
        Self::prune(&mut calls, Instant::now(), self.config.window);
        (calls.len() as u32) < self.config.max_calls
    }

    /// Suspend until a slot frees, then record a new call.
    ///
    /// Returns `DigestError::Timeout` only when `max_wait` is configured
    /// and exceeded; the default waits as long as it takes.
    pub async fn acquire(&self) -> Result<()> {
        let deadline = self.config.max_wait.map(|w| Instant::now() + w);

        loop {
            let wait = {
                let mut calls = self.calls.lock().await;
                let now = Instant::now();
                Self::prune(&mut calls, now, self.config.window);

                if (calls.len() as u32) < self.config.max_calls {
                    calls.push_back(now);
                    self.total.fetch_add(1, Ordering::Relaxed);
                    trace!(used = calls.len(), "rate limiter slot acquired");
                    return Ok(());
                }

                match calls.front() {
                    Some(&oldest) => {
                        self.config.window.saturating_sub(now - oldest) + self.config.safety_margin
                    }
                    // Window full but empty cannot happen with max_calls >= 1;
                    // re-check after the safety margin.
                    None => self.config.safety_margin,
                }
            };

            if let Some(deadline) = deadline
                && Instant::now() + wait > deadline
            {
                return Err(DigestError::timeout(
                    "rate limiter slot",
                    self.config.max_wait.unwrap_or_default(),
                ));
            }

            debug!(wait_ms = wait.as_millis() as u64, "rate limit window full, waiting");
            sleep(wait).await;
        }
    }

    /// Scoped acquisition: await a slot, invoke `op`, return its result.
    ///
    /// The call stays recorded even when `op` fails, since the record
    /// reflects API usage rather than success.
    pub async fn execute<T, F, Fut>(&self, operation: &str, op: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.acquire().await?;
        trace!(operation, "executing rate-limited operation");
        op().await
    }

    /// Calls recorded since construction. Unlike `usage_stats`, this
    /// never decays as timestamps age out of the window, so callers can
    /// diff two readings to count the calls a span of work issued.
    pub fn total_calls(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Snapshot of the current window
    pub async fn usage_stats(&self) -> UsageStats {
        let mut calls = self.calls.lock().await;
        let now = Instant::now();
        Self::prune(&mut calls, now, self.config.window);

        let used = calls.len() as u32;
        UsageStats {
            used,
            remaining: self.config.max_calls.saturating_sub(used),
            reset_in: calls
                .front()
                .map(|&oldest| self.config.window.saturating_sub(now - oldest)),
        }
    }

    /// Drop timestamps older than the window. Front of the deque is oldest.
    fn prune(calls: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(&oldest) = calls.front() {
            if now.duration_since(oldest) >= window {
                calls.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RateLimitConfig {
        RateLimitConfig {
            max_calls: 3,
            window: Duration::from_secs(60),
            safety_margin: Duration::from_millis(500),
            max_wait: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_allows_calls_under_limit() {
        let limiter = RateLimiter::new(test_config());
        for _ in 0..3 {
            assert!(limiter.can_proceed().await);
            limiter.acquire().await.unwrap();
        }
        assert!(!limiter.can_proceed().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_records_call_on_failure() {
        let limiter = RateLimiter::new(test_config());
        let result: Result<()> = limiter
            .execute("failing call", || async {
                Err(DigestError::LlmApi("boom".into()))
            })
            .await;
        assert!(result.is_err());

        // The failed call still consumed a slot
        let stats = limiter.usage_stats().await;
        assert_eq!(stats.used, 1);
        assert_eq!(stats.remaining, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_suspends_for_remaining_window() {
        let limiter = RateLimiter::new(test_config());
        for _ in 0..3 {
            limiter.acquire().await.unwrap();
        }

        // Paused clock: sleep auto-advances, so elapsed time equals the
        // computed wait of window + safety margin.
        let before = Instant::now();
        limiter.acquire().await.unwrap();
        let waited = before.elapsed();
        assert!(waited >= Duration::from_secs(60));
        assert!(waited <= Duration::from_secs(62));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_frees_after_duration() {
        let limiter = RateLimiter::new(test_config());
        for _ in 0..3 {
            limiter.acquire().await.unwrap();
        }
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(limiter.can_proceed().await);
        let stats = limiter.usage_stats().await;
        assert_eq!(stats.used, 0);
        assert_eq!(stats.remaining, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_calls_survives_window_pruning() {
        let limiter = RateLimiter::new(test_config());
        for _ in 0..3 {
            limiter.acquire().await.unwrap();
        }
        tokio::time::advance(Duration::from_secs(61)).await;
        limiter.acquire().await.unwrap();

        // The window forgot the first three calls; the total did not
        assert_eq!(limiter.usage_stats().await.used, 1);
        assert_eq!(limiter.total_calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_never_underflows() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_calls: 1,
            ..test_config()
        });
        limiter.acquire().await.unwrap();
        let stats = limiter.usage_stats().await;
        assert_eq!(stats.remaining, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_wait_times_out() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_calls: 1,
            max_wait: Some(Duration::from_secs(5)),
            ..test_config()
        });
        limiter.acquire().await.unwrap();
        let result = limiter.acquire().await;
        assert!(matches!(result, Err(DigestError::Timeout { .. })));
    }

    #[test]
    fn test_config_validation() {
        assert!(RateLimitConfig::default().validate().is_ok());
        assert!(
            RateLimitConfig {
                max_calls: 0,
                ..Default::default()
            }
            .validate()
            .is_err()
        );
        assert!(
            RateLimitConfig {
                window: Duration::ZERO,
                ..Default::default()
            }
            .validate()
            .is_err()
        );
    }
}
