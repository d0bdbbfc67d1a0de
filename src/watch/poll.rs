// src/watch/poll.rs

//! The shared "check, sleep, check again until the deadline" loop.
//!
//! Every waiter in this crate is a `step` closure that either finds what it
//! is looking for (`Ok(Some(_))`), has not found it yet (`Ok(None)`), or hit
//! a fatal error (`Err(_)`). The drivers here own the timing:
//!
//! - [`poll_until`] blocks the calling thread, using a [`Clock`].
//! - [`poll_until_async`] yields to the Tokio runtime between attempts.
//!
//! Both check the deadline *before* each attempt, so a zero timeout performs
//! no attempts, and both clamp the final sleep to the time remaining, so the
//! loop gives up at the deadline rather than up to one interval after it.

use std::time::Duration;

use tracing::{debug, trace};

use crate::clock::Clock;
use crate::errors::{DlwatchError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How long to keep trying, and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollSchedule {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Reject schedules that would spin: the interval must be non-zero.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(DlwatchError::InvalidRequest(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Drive `step` until it yields a value or `schedule.timeout` elapses.
///
/// Returns `Ok(None)` on timeout. Errors from `step` abort the loop.
pub fn poll_until<T, F>(clock: &dyn Clock, schedule: PollSchedule, mut step: F) -> Result<Option<T>>
where
    F: FnMut() -> Result<Option<T>>,
{
    schedule.validate()?;

    let start = clock.now();
    let mut attempts: u64 = 0;

    loop {
        let elapsed = clock.now().saturating_duration_since(start);
        if elapsed >= schedule.timeout {
            debug!(attempts, ?elapsed, "poll deadline reached");
            return Ok(None);
        }

        attempts += 1;
        trace!(attempts, ?elapsed, "poll attempt");
        if let Some(found) = step()? {
            debug!(attempts, "poll attempt succeeded");
            return Ok(Some(found));
        }

        let elapsed = clock.now().saturating_duration_since(start);
        let remaining = schedule.timeout.saturating_sub(elapsed);
        clock.sleep(schedule.interval.min(remaining));
    }
}

/// Async flavour of [`poll_until`], sleeping with `tokio::time`.
///
/// `step` itself is synchronous; the checks it performs (a directory listing,
/// an open/close probe) are short.
pub async fn poll_until_async<T, F>(schedule: PollSchedule, mut step: F) -> Result<Option<T>>
where
    F: FnMut() -> Result<Option<T>>,
{
    schedule.validate()?;

    let start = tokio::time::Instant::now();
    let mut attempts: u64 = 0;

    loop {
        let elapsed = start.elapsed();
        if elapsed >= schedule.timeout {
            debug!(attempts, ?elapsed, "poll deadline reached");
            return Ok(None);
        }

        attempts += 1;
        trace!(attempts, ?elapsed, "poll attempt");
        if let Some(found) = step()? {
            debug!(attempts, "poll attempt succeeded");
            return Ok(Some(found));
        }

        let remaining = schedule.timeout.saturating_sub(start.elapsed());
        tokio::time::sleep(schedule.interval.min(remaining)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn times_out_only_after_full_timeout() {
        let clock = ManualClock::new();
        let mut attempts = 0;

        let result: Option<()> = poll_until(&clock, PollSchedule::new(secs(2), secs(1)), || {
            attempts += 1;
            Ok(None)
        })
        .unwrap();

        assert!(result.is_none());
        assert_eq!(attempts, 2);
        assert_eq!(clock.elapsed(), secs(2));
    }

    #[test]
    fn last_sleep_is_clamped_to_remaining_time() {
        let clock = ManualClock::new();

        let result: Option<()> = poll_until(
            &clock,
            PollSchedule::new(Duration::from_millis(2500), secs(1)),
            || Ok(None),
        )
        .unwrap();

        assert!(result.is_none());
        assert_eq!(
            clock.sleeps(),
            vec![secs(1), secs(1), Duration::from_millis(500)]
        );
    }

    #[test]
    fn zero_timeout_makes_no_attempts() {
        let clock = ManualClock::new();
        let mut attempts = 0;

        let result: Option<()> = poll_until(&clock, PollSchedule::new(Duration::ZERO, secs(1)), || {
            attempts += 1;
            Ok(None)
        })
        .unwrap();

        assert!(result.is_none());
        assert_eq!(attempts, 0);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn returns_first_success_without_sleeping_again() {
        let clock = ManualClock::new();
        let mut attempts = 0;

        let result = poll_until(&clock, PollSchedule::new(secs(10), secs(1)), || {
            attempts += 1;
            Ok((attempts == 3).then_some("ready"))
        })
        .unwrap();

        assert_eq!(result, Some("ready"));
        assert_eq!(clock.sleeps(), vec![secs(1), secs(1)]);
    }

    #[test]
    fn step_errors_abort_the_loop() {
        let clock = ManualClock::new();

        let err = poll_until::<(), _>(&clock, PollSchedule::new(secs(10), secs(1)), || {
            Err(DlwatchError::DirectoryNotFound("gone".into()))
        })
        .unwrap_err();

        assert!(matches!(err, DlwatchError::DirectoryNotFound(_)));
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn zero_interval_is_rejected_before_any_attempt() {
        let clock = ManualClock::new();
        let mut attempts = 0;

        let err = poll_until::<(), _>(&clock, PollSchedule::new(secs(5), Duration::ZERO), || {
            attempts += 1;
            Ok(None)
        })
        .unwrap_err();

        assert!(matches!(err, DlwatchError::InvalidRequest(_)));
        assert_eq!(attempts, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn async_driver_respects_timeout() {
        let start = tokio::time::Instant::now();
        let mut attempts = 0;

        let result: Option<()> = poll_until_async(PollSchedule::new(secs(2), secs(1)), || {
            attempts += 1;
            Ok(None)
        })
        .await
        .unwrap();

        assert!(result.is_none());
        assert_eq!(attempts, 2);
        assert!(start.elapsed() >= secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn async_driver_returns_value() {
        let mut attempts = 0;

        let result = poll_until_async(PollSchedule::new(secs(5), secs(1)), || {
            attempts += 1;
            Ok((attempts == 2).then_some(42))
        })
        .await
        .unwrap();

        assert_eq!(result, Some(42));
    }
}
