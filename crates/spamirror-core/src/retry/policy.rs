use std::time::Duration;

/// How a failed asset fetch should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connect or transfer timed out.
    Timeout,
    /// The host answered 429 or 503.
    Throttled,
    /// Connection reset, DNS hiccup, or another 5xx.
    Transient,
    /// 4xx, bad URL, local disk trouble. Retrying will not help.
    Permanent,
}

/// Capped exponential backoff, built from `[retry]` in the config.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per asset, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt after attempt `attempt` (1-based)
    /// failed with `kind`, or `None` to give up.
    pub fn next_delay(&self, attempt: u32, kind: FailureKind) -> Option<Duration> {
        if attempt >= self.max_attempts || kind == FailureKind::Permanent {
            return None;
        }
        let shift = attempt.saturating_sub(1).min(8);
        let mut delay = self.base_delay.saturating_mul(1 << shift);
        if kind == FailureKind::Throttled {
            delay = delay.saturating_mul(2);
        }
        Some(delay.min(self.max_delay))
    }
}
