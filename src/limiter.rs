//! Request pacing for the CDO service's published quotas
//! (5 requests/second and 10,000 requests/day per token).
//!
//! Both windows are strict sliding windows over admission timestamps, not
//! token buckets: at most `capacity` admissions exist in any rolling
//! `period`, so a burst that fills a window stalls the next caller until a
//! full period has passed since the oldest admission. Admissions are
//! recorded only at the moment a request is let through, which means a
//! caller cancelled while waiting consumes no capacity.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug)]
struct Window {
    capacity: usize,
    period: Duration,
    admitted: VecDeque<Instant>,
}

impl Window {
    fn new(capacity: usize, period: Duration) -> Self {
        assert!(capacity > 0, "window capacity must be non-zero");
        Self {
            capacity,
            period,
            admitted: VecDeque::with_capacity(capacity),
        }
    }

    fn prune(&mut self, now: Instant) {
        while let Some(oldest) = self.admitted.front() {
            if *oldest + self.period <= now {
                self.admitted.pop_front();
            } else {
                break;
            }
        }
    }

    /// `None` when a slot is free right now, otherwise the earliest instant
    /// at which one frees up.
    fn free_at(&self) -> Option<Instant> {
        if self.admitted.len() < self.capacity {
            None
        } else {
            self.admitted.front().map(|oldest| *oldest + self.period)
        }
    }

    fn admit(&mut self, now: Instant) {
        self.admitted.push_back(now);
    }
}

/// The pair of limiters every request must pass before dispatch.
#[derive(Debug)]
pub struct RequestPacer {
    windows: Mutex<(Window, Window)>,
}

impl RequestPacer {
    /// Pacer for `per_second` requests per second and `per_day` per day.
    pub fn new(per_second: usize, per_day: usize) -> Self {
        Self::with_windows(
            per_second,
            Duration::from_secs(1),
            per_day,
            Duration::from_secs(60 * 60 * 24),
        )
    }

    /// Pacer with explicit window sizes.
    pub fn with_windows(
        short_capacity: usize,
        short_period: Duration,
        long_capacity: usize,
        long_period: Duration,
    ) -> Self {
        Self {
            windows: Mutex::new((
                Window::new(short_capacity, short_period),
                Window::new(long_capacity, long_period),
            )),
        }
    }

    /// Suspends until both windows have spare capacity, then consumes one
    /// unit from each atomically (under a single lock).
    pub async fn acquire(&self) {
        loop {
            let deadline = {
                let mut guard = self.windows.lock().expect("pacer lock poisoned");
                let (short, long) = &mut *guard;
                let now = Instant::now();
                short.prune(now);
                long.prune(now);

                match (short.free_at(), long.free_at()) {
                    (None, None) => {
                        short.admit(now);
                        long.admit(now);
                        return;
                    }
                    (a, b) => a.into_iter().chain(b).max().expect("at least one deadline"),
                }
            };

            tokio::time::sleep_until(deadline).await;
        }
    }
}
