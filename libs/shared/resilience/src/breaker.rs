// [libs/shared/resilience/src/breaker.rs]
//! Circuit breaker: opens after N consecutive failures, half-opens
//! after a cooldown to probe recovery. Defaults by default 5
//! failures → 30s open.

use std::time::{Duration, Instant};

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// Not `Send`-shared directly — owners wrap this in a `Mutex` or keep
/// one instance per single-owner actor task, the same way a device
/// session's sequence counter is never touched across an await point
/// without exclusive ownership.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    open_duration: Duration,
    consecutive_failures: u32,
    state: BreakerState,
    opened_at: Option<Instant>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(30))
    }
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, open_duration: Duration) -> Self {
        Self {
            failure_threshold,
            open_duration,
            consecutive_failures: 0,
            state: BreakerState::Closed,
            opened_at: None,
        }
    }

    pub fn state(&self) -> BreakerState {
        self.state
    }

    /// Whether a call is currently allowed through. Transitions
    /// `Open -> HalfOpen` once the cooldown has elapsed; the caller is
    /// expected to call `record_success`/`record_failure` on the
    /// outcome of the probe call this permits.
    pub fn allow_request(&mut self) -> bool {
        match self.state {
            BreakerState::Closed => true,
            BreakerState::HalfOpen => true,
            BreakerState::Open => {
                let elapsed = self
                    .opened_at
                    .map(|at| at.elapsed())
                    .unwrap_or(Duration::ZERO);
                if elapsed >= self.open_duration {
                    self.state = BreakerState::HalfOpen;
                    info!("circuit breaker half-open after {:?} cooldown", elapsed);
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&mut self) {
        if self.state != BreakerState::Closed {
            info!("circuit breaker closed after recovery probe succeeded");
        }
        self.consecutive_failures = 0;
        self.state = BreakerState::Closed;
        self.opened_at = None;
    }

    pub fn record_failure(&mut self) {
        self.consecutive_failures += 1;

        match self.state {
            BreakerState::HalfOpen => {
                warn!("circuit breaker re-opened: recovery probe failed");
                self.trip();
            }
            BreakerState::Closed if self.consecutive_failures >= self.failure_threshold => {
                warn!(
                    "circuit breaker tripped after {} consecutive failures",
                    self.consecutive_failures
                );
                self.trip();
            }
            _ => {}
        }
    }

    fn trip(&mut self) {
        self.state = BreakerState::Open;
        self.opened_at = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_closed_under_threshold() {
        let mut breaker = CircuitBreaker::new(5, Duration::from_secs(30));
        for _ in 0..4 {
            breaker.record_failure();
        }
        assert_eq!(breaker.state(), BreakerState::Closed);
        assert!(breaker.allow_request());
    }

    #[test]
    fn trips_open_at_threshold_and_blocks_requests() {
        let mut breaker = CircuitBreaker::new(5, Duration::from_secs(30));
        for _ in 0..5 {
            breaker.record_failure();
        }
        assert_eq!(breaker.state(), BreakerState::Open);
        assert!(!breaker.allow_request());
    }

    #[test]
    fn half_open_probe_failure_reopens() {
        let mut breaker = CircuitBreaker::new(2, Duration::from_millis(1));
        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);

        std::thread::sleep(Duration::from_millis(5));
        assert!(breaker.allow_request());
        assert_eq!(breaker.state(), BreakerState::HalfOpen);

        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
    }

    #[test]
    fn half_open_probe_success_closes() {
        let mut breaker = CircuitBreaker::new(1, Duration::from_millis(1));
        breaker.record_failure();
        std::thread::sleep(Duration::from_millis(5));
        assert!(breaker.allow_request());

        breaker.record_success();
        assert_eq!(breaker.state(), BreakerState::Closed);
    }
}
