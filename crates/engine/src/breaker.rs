// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-local circuit breaker gating calls to the [`crate::scorer::Scorer`].
//! Three states: closed, open, half_open. Opens after three consecutive
//! slow/failing calls, cools down for 60 s, then probes once in half_open.

use std::sync::Mutex;
use std::time::{Duration, Instant};

const FAILURE_THRESHOLD: u32 = 3;
const LATENCY_THRESHOLD_MS: u64 = 500;
const COOL_DOWN: Duration = Duration::from_secs(60);

/// An exception from the Scorer counts as a failure regardless of how fast
/// it returned — modeled as an infinite latency so it always exceeds
/// `LATENCY_THRESHOLD_MS` (Design Note "Breaker failure rule").
pub const EXCEPTION_LATENCY_MS: u64 = u64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: State,
    failure_count: u32,
    last_failure_at: Option<Instant>,
}

/// Not `Send`-shared across workers by design — each [`crate::worker::ProcessingWorker`]
/// owns one.
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner { state: State::Closed, failure_count: 0, last_failure_at: None }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether a Scorer call is currently permitted. In `open`, flips to
    /// `half_open` and allows the single probe once the cool-down elapses.
    pub fn allow(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            State::Closed | State::HalfOpen => true,
            State::Open => {
                let cooled_down = inner
                    .last_failure_at
                    .map(|t| t.elapsed() >= COOL_DOWN)
                    .unwrap_or(true);
                if cooled_down {
                    inner.state = State::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record the outcome of a call that `allow()` admitted.
    pub fn record(&self, latency_ms: u64) {
        let mut inner = self.lock();
        let failed = latency_ms > LATENCY_THRESHOLD_MS;
        match inner.state {
            State::Closed => {
                if failed {
                    inner.failure_count += 1;
                    inner.last_failure_at = Some(Instant::now());
                    if inner.failure_count >= FAILURE_THRESHOLD {
                        inner.state = State::Open;
                    }
                } else {
                    inner.failure_count = 0;
                }
            }
            State::HalfOpen => {
                if failed {
                    inner.failure_count += 1;
                    inner.last_failure_at = Some(Instant::now());
                    inner.state =
                        if inner.failure_count >= FAILURE_THRESHOLD { State::Open } else { State::Closed };
                } else {
                    inner.failure_count = 0;
                    inner.state = State::Closed;
                }
            }
            State::Open => {
                // A record without a preceding allow()'d call shouldn't
                // normally happen; treat it like a closed-state observation.
                if failed {
                    inner.failure_count += 1;
                    inner.last_failure_at = Some(Instant::now());
                } else {
                    inner.failure_count = 0;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_three_consecutive_slow_calls() {
        let breaker = CircuitBreaker::new();
        assert!(breaker.allow());
        breaker.record(600);
        assert!(breaker.allow());
        breaker.record(600);
        assert!(breaker.allow());
        breaker.record(600);
        assert!(!breaker.allow());
    }

    #[test]
    fn fast_call_resets_failure_count() {
        let breaker = CircuitBreaker::new();
        breaker.record(600);
        breaker.record(600);
        breaker.record(100);
        breaker.record(600);
        breaker.record(600);
        // Only two consecutive failures since the reset; still closed.
        assert!(breaker.allow());
    }

    #[test]
    fn half_open_probe_closes_on_success() {
        let breaker = CircuitBreaker::new();
        for _ in 0..3 {
            breaker.allow();
            breaker.record(600);
        }
        assert!(!breaker.allow());

        // Force the cool-down to have elapsed.
        {
            let mut inner = breaker.lock();
            inner.last_failure_at = Some(Instant::now() - Duration::from_secs(61));
        }
        assert!(breaker.allow());
        breaker.record(100);

        let state_is_closed = {
            let inner = breaker.lock();
            inner.state == State::Closed
        };
        assert!(state_is_closed);
        assert!(breaker.allow());
    }

    #[test]
    fn half_open_probe_reopens_on_failure() {
        let breaker = CircuitBreaker::new();
        for _ in 0..3 {
            breaker.allow();
            breaker.record(600);
        }
        {
            let mut inner = breaker.lock();
            inner.last_failure_at = Some(Instant::now() - Duration::from_secs(61));
        }
        assert!(breaker.allow());
        breaker.record(600);
        assert!(!breaker.allow());
    }

    #[test]
    fn exception_latency_always_counts_as_failure() {
        assert!(EXCEPTION_LATENCY_MS > LATENCY_THRESHOLD_MS);
    }
}
