//! Bounded retry with a shared exponential backoff.
//!
//! One [`Backoff`] lives for one logical request. Every retry class draws from
//! the same backoff value, which doubles after each retry up to the cap of the
//! class that just retried.

use core_runtime::config::{BackoffSettings, RetrySettings};
use rand::Rng;
use std::time::Duration;

/// Failure classes that are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// No HTTP response was received.
    Network,
    /// HTTP 429, with the parsed `Retry-After` seconds if present.
    RateLimited { retry_after_secs: Option<u64> },
    /// HTTP 500, 502, 503 or 504.
    Server,
}

impl RetryClass {
    /// Classifies an HTTP status, `None` for statuses that are not retried.
    pub fn from_status(status: u16, retry_after: Option<&str>) -> Option<Self> {
        match status {
            429 => Some(RetryClass::RateLimited {
                retry_after_secs: retry_after.and_then(parse_retry_after),
            }),
            500 | 502 | 503 | 504 => Some(RetryClass::Server),
            _ => None,
        }
    }
}

/// Leading integer of a `Retry-After` value, in seconds.
///
/// `"1.5"` reads as 1 and `"30s"` as 30. Negative values read as 0 and are
/// raised to the floor later. HTTP-date values are ignored.
fn parse_retry_after(value: &str) -> Option<u64> {
    let value = value.trim_start();
    let (negative, unsigned) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };

    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..end];
    if digits.is_empty() {
        return None;
    }
    if negative {
        return Some(0);
    }

    // Too many digits for u64 still means "wait as long as allowed".
    Some(digits.parse().unwrap_or(u64::MAX))
}

/// Retry budget shared by every request of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    settings: RetrySettings,
}

impl RetryPolicy {
    pub fn new(settings: RetrySettings) -> Self {
        Self { settings }
    }

    pub fn max_retries(&self) -> u32 {
        self.settings.max_retries
    }

    /// Fresh backoff state for one logical request.
    pub fn start(&self) -> Backoff {
        Backoff {
            settings: self.settings,
            attempt: 0,
            backoff_ms: self.settings.base_delay_ms,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetrySettings::default())
    }
}

/// Backoff state of one logical request.
#[derive(Debug, Clone)]
pub struct Backoff {
    settings: RetrySettings,
    attempt: u32,
    backoff_ms: u64,
}

impl Backoff {
    /// Retries performed so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Current backoff before jitter.
    pub fn current_ms(&self) -> u64 {
        self.backoff_ms
    }

    /// Delay before the next retry, or `None` once the budget is spent.
    pub fn next_delay(&mut self, class: RetryClass) -> Option<Duration> {
        self.next_delay_with(class, &mut rand::thread_rng())
    }

    /// [`Backoff::next_delay`] with an explicit RNG for the jitter.
    pub fn next_delay_with<R: Rng + ?Sized>(
        &mut self,
        class: RetryClass,
        rng: &mut R,
    ) -> Option<Duration> {
        if self.attempt >= self.settings.max_retries {
            return None;
        }

        let (wait_ms, backoff) = match class {
            RetryClass::Network => (self.backoff_ms, self.settings.network),
            RetryClass::Server => (self.backoff_ms, self.settings.server),
            RetryClass::RateLimited { retry_after_secs } => {
                let requested = retry_after_secs
                    .map(|secs| secs.saturating_mul(1000))
                    .unwrap_or(self.backoff_ms);
                let clamped = requested
                    .min(self.settings.rate_limit.cap_ms)
                    .max(self.settings.rate_limit_floor_ms);
                (clamped, self.settings.rate_limit)
            }
        };

        let delay = wait_ms + jitter(&backoff, rng);

        self.attempt += 1;
        self.backoff_ms = self.backoff_ms.saturating_mul(2).min(backoff.cap_ms);

        Some(Duration::from_millis(delay))
    }
}

fn jitter<R: Rng + ?Sized>(backoff: &BackoffSettings, rng: &mut R) -> u64 {
    if backoff.jitter_ms == 0 {
        0
    } else {
        rng.gen_range(0..backoff.jitter_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn no_jitter() -> RetrySettings {
        let mut settings = RetrySettings::default();
        settings.network.jitter_ms = 0;
        settings.server.jitter_ms = 0;
        settings.rate_limit.jitter_ms = 0;
        settings
    }

    fn delays(backoff: &mut Backoff, class: RetryClass) -> Vec<u64> {
        std::iter::from_fn(|| backoff.next_delay(class))
            .map(|d| d.as_millis() as u64)
            .collect()
    }

    #[test]
    fn test_network_backoff_doubles_and_caps() {
        let mut settings = no_jitter();
        settings.max_retries = 7;
        let mut backoff = RetryPolicy::new(settings).start();

        assert_eq!(
            delays(&mut backoff, RetryClass::Network),
            vec![750, 1500, 3000, 6000, 12000, 15000, 15000]
        );
        assert_eq!(backoff.attempt(), 7);
    }

    #[test]
    fn test_budget_is_five_retries() {
        let mut backoff = RetryPolicy::default().start();

        assert_eq!(delays(&mut backoff, RetryClass::Server).len(), 5);
        assert!(backoff.next_delay(RetryClass::Network).is_none());
    }

    #[test]
    fn test_jitter_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let mut backoff = RetryPolicy::default().start();
            let network = backoff
                .next_delay_with(RetryClass::Network, &mut rng)
                .unwrap()
                .as_millis() as u64;
            assert!((750..1000).contains(&network));

            let server = backoff
                .next_delay_with(RetryClass::Server, &mut rng)
                .unwrap()
                .as_millis() as u64;
            assert!((1500..1900).contains(&server));
        }
    }

    #[test]
    fn test_rate_limit_retry_after_is_clamped() {
        let policy = RetryPolicy::new(no_jitter());

        let mut backoff = policy.start();
        let huge = RetryClass::RateLimited {
            retry_after_secs: Some(120),
        };
        assert_eq!(backoff.next_delay(huge), Some(Duration::from_millis(30_000)));

        let mut backoff = policy.start();
        let zero = RetryClass::RateLimited {
            retry_after_secs: Some(0),
        };
        assert_eq!(backoff.next_delay(zero), Some(Duration::from_millis(1_000)));

        let mut backoff = policy.start();
        let three = RetryClass::RateLimited {
            retry_after_secs: Some(3),
        };
        assert_eq!(backoff.next_delay(three), Some(Duration::from_millis(3_000)));
    }

    #[test]
    fn test_rate_limit_without_header_uses_backoff() {
        let mut backoff = RetryPolicy::new(no_jitter()).start();
        let class = RetryClass::RateLimited {
            retry_after_secs: None,
        };

        // 750 is raised to the 1000ms floor.
        assert_eq!(
            delays(&mut backoff, class),
            vec![1000, 1500, 3000, 6000, 12000]
        );
    }

    #[test]
    fn test_backoff_is_shared_across_classes() {
        let mut settings = no_jitter();
        settings.max_retries = 6;
        let mut backoff = RetryPolicy::new(settings).start();
        let rate_limited = RetryClass::RateLimited {
            retry_after_secs: None,
        };

        for _ in 0..5 {
            backoff.next_delay(rate_limited);
        }
        // 429 retries grew the backoff to 24000; a 5xx retry waits that long.
        assert_eq!(backoff.current_ms(), 24_000);
        assert_eq!(
            backoff.next_delay(RetryClass::Server),
            Some(Duration::from_millis(24_000))
        );
        // Then the 5xx cap applies.
        assert_eq!(backoff.current_ms(), 15_000);
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(RetryClass::from_status(503, None), Some(RetryClass::Server));
        assert_eq!(RetryClass::from_status(501, None), None);
        assert_eq!(RetryClass::from_status(404, None), None);
        assert_eq!(
            RetryClass::from_status(429, Some(" 7 ")),
            Some(RetryClass::RateLimited {
                retry_after_secs: Some(7)
            })
        );
        assert_eq!(
            RetryClass::from_status(429, Some("Wed, 21 Oct 2015 07:28:00 GMT")),
            Some(RetryClass::RateLimited {
                retry_after_secs: None
            })
        );
    }

    #[test]
    fn test_retry_after_reads_leading_integer() {
        assert_eq!(parse_retry_after("1.5"), Some(1));
        assert_eq!(parse_retry_after("30s"), Some(30));
        assert_eq!(parse_retry_after("+4"), Some(4));
        assert_eq!(parse_retry_after("-5"), Some(0));
        assert_eq!(parse_retry_after("99999999999999999999999"), Some(u64::MAX));
        assert_eq!(parse_retry_after(""), None);
        assert_eq!(parse_retry_after(".5"), None);
    }

    #[test]
    fn test_fractional_retry_after_is_raised_to_floor() {
        let policy = RetryPolicy::default();
        let mut backoff = policy.start();
        let mut rng = StdRng::seed_from_u64(3);

        let class = RetryClass::from_status(429, Some("0.9")).unwrap();
        let delay = backoff.next_delay_with(class, &mut rng).unwrap();

        assert!(delay >= Duration::from_millis(1000));
        assert!(delay < Duration::from_millis(1400));
    }
}
