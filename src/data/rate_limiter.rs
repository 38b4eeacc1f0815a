use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::config::DF;

/// Request-weight budget per wall-clock minute, shared by every worker that talks to the exchange.
#[derive(Clone)]
pub struct GlobalRateLimiter {
    inner: Arc<Mutex<InnerLimiter>>,
}

struct InnerLimiter {
    used_weight: u32,
    // The specific minute we are currently counting for
    // e.g. 28,500,123 minutes since Epoch
    current_minute_idx: u64,
    limit: u32,
}

impl InnerLimiter {
    /// Books `cost` against the minute containing `now_secs`, or returns how long to wait.
    fn try_book(&mut self, cost: u32, now_secs: u64) -> Result<(), Duration> {
        let now_idx = now_secs / 60;
        if now_idx > self.current_minute_idx {
            self.used_weight = 0;
            self.current_minute_idx = now_idx;
        }

        // A single call heavier than the whole budget still gets through on a fresh minute
        if self.used_weight + cost <= self.limit || self.used_weight == 0 {
            self.used_weight += cost;
            return Ok(());
        }

        // Wait until next :00, plus a small buffer to land IN the next minute
        let wait_secs = 60 - now_secs % 60;
        Err(Duration::from_secs(wait_secs) + Duration::from_millis(100))
    }
}

impl GlobalRateLimiter {
    pub fn new(limit: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(InnerLimiter {
                used_weight: 0,
                current_minute_idx: Self::now_secs() / 60,
                limit,
            })),
        }
    }

    /// Acquires permission to use `cost` weight, sleeping across minute boundaries if needed.
    pub async fn acquire(&self, cost: u32, context: &str) {
        loop {
            let (wait, used, limit) = {
                let mut guard = self.inner.lock().await;
                match guard.try_book(cost, Self::now_secs()) {
                    Ok(()) => return,
                    Err(wait) => (wait, guard.used_weight, guard.limit),
                }
            };

            if DF.log_rate_limiter {
                log::warn!(
                    "🛑 Rate Limit Saturated for [{}]. Used: {}/{}. Waiting {:.1}s (until :00)...",
                    context,
                    used,
                    limit,
                    wait.as_secs_f64()
                );
            }

            tokio::time::sleep(wait).await;
        }
    }

    fn now_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
    }
}
