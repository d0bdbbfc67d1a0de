// src/clock.rs

//! Time source for the blocking poll loops.
//!
//! [`SystemClock`] sleeps the calling thread. [`ManualClock`] never sleeps:
//! it advances a virtual instant and can run a hook on every sleep, which is
//! how tests script "the download finishes after the second poll".

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// Monotonic "now", used only for elapsed-time accounting.
    fn now(&self) -> Instant;

    /// Block for `duration`.
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

type SleepHook = Box<dyn FnMut(Duration) + Send>;

/// Virtual clock. `now()` is a fixed origin plus everything slept so far.
#[derive(Clone)]
pub struct ManualClock {
    origin: Instant,
    inner: Arc<Mutex<ManualState>>,
}

struct ManualState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
    hook: Option<SleepHook>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            inner: Arc::new(Mutex::new(ManualState {
                elapsed: Duration::ZERO,
                sleeps: Vec::new(),
                hook: None,
            })),
        }
    }

    /// Run `hook` with the total elapsed time after every sleep.
    ///
    /// The hook runs under the clock's lock and must not call back into it.
    pub fn on_sleep(self, hook: impl FnMut(Duration) + Send + 'static) -> Self {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .hook = Some(Box::new(hook));
        self
    }

    /// Total virtual time slept.
    pub fn elapsed(&self) -> Duration {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed
    }

    /// Every individual sleep request, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sleeps
            .clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualClock")
            .field("elapsed", &self.elapsed())
            .finish_non_exhaustive()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.elapsed += duration;
        state.sleeps.push(duration);
        let elapsed = state.elapsed;
        if let Some(hook) = state.hook.as_mut() {
            hook(elapsed);
        }
    }
}
