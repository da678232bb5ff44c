// [libs/shared/resilience/src/lib.rs]
/*!
 * =================================================================
 * APARATO: RESILIENCE UTILITIES (BACKOFF + CIRCUIT BREAKER)
 * CLASIFICACION: SHARED KERNEL (ESTRATO L4)
 * RESPONSABILIDAD: POLITICA DE REINTENTOS Y CONTENCION DE FALLOS
 *
 * Retries are the caller's choice — core client functions
 * stay single-shot. This crate is the toolbox the callers that *do*
 * retry (the polling service, the Tapo client's reconnect path) reach
 * for, so every retry loop in the fabric shares one tested policy
 * instead of re-deriving jitter math ad hoc.
 * =================================================================
 */

use std::time::Duration;

use rand::Rng;

mod breaker;
pub use breaker::{BreakerState, CircuitBreaker};

/// Exponential backoff with jitter.
///
/// Defaults by default max 3 attempts, 100ms initial delay, 30s cap,
/// factor 2, 10% jitter.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    factor: f64,
    jitter: f64,
    max_attempts: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: 0.10,
            max_attempts: 3,
        }
    }
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, factor: f64, jitter: f64, max_attempts: u32) -> Self {
        Self {
            initial,
            max,
            factor,
            jitter,
            max_attempts,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The delay to wait before attempt number `attempt` (1-indexed;
    /// attempt 1 is the first *retry*, not the initial try).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let raw_millis = self.initial.as_millis() as f64 * self.factor.powi(exponent);
        let capped_millis = raw_millis.min(self.max.as_millis() as f64);

        let mut rng = rand::thread_rng();
        let jitter_span = capped_millis * self.jitter;
        let jittered_millis = capped_millis + rng.gen_range(-jitter_span..=jitter_span);

        Duration::from_millis(jittered_millis.max(0.0) as u64)
    }

    /// Delay bounds ignoring jitter — useful for tests that want to
    /// assert monotonic growth without fighting randomness.
    pub fn unjittered_delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let raw_millis = self.initial.as_millis() as f64 * self.factor.powi(exponent);
        Duration::from_millis(raw_millis.min(self.max.as_millis() as f64) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unjittered_delay_grows_by_factor_until_capped() {
        let backoff = Backoff::default();
        assert_eq!(backoff.unjittered_delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(backoff.unjittered_delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(backoff.unjittered_delay_for_attempt(3), Duration::from_millis(400));
    }

    #[test]
    fn delay_never_exceeds_max_even_with_jitter() {
        let backoff = Backoff::new(
            Duration::from_secs(20),
            Duration::from_secs(30),
            2.0,
            0.10,
            3,
        );
        for attempt in 1..=10 {
            let delay = backoff.delay_for_attempt(attempt);
            assert!(delay <= Duration::from_millis(33_000));
        }
    }

    #[test]
    fn default_matches_spec_constants() {
        let backoff = Backoff::default();
        assert_eq!(backoff.max_attempts(), 3);
        assert_eq!(backoff.initial, Duration::from_millis(100));
        assert_eq!(backoff.max, Duration::from_secs(30));
    }
}
