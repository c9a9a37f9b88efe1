/*!
Abstract monotonic time source, injected so the scheduler and registry sweep
can be driven by a fake clock under test (see `spec.md` §8, scenario S4).
*/
use std::time::{Duration, Instant};

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

///
/// A source of monotonic time. `now()` returns a `Duration` measured from some
/// arbitrary but fixed epoch private to the implementation; only differences
/// between two calls are meaningful.
///
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

///
/// The production clock, backed by `std::time::Instant`.
///
#[derive(Debug)]
pub struct SystemClock {
    epoch: Instant,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock {
            epoch: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// A clock whose value is set explicitly by tests.
    #[derive(Debug, Default)]
    pub struct FakeClock {
        now_secs: AtomicU64,
    }

    impl FakeClock {
        pub fn at(secs: u64) -> Self {
            FakeClock {
                now_secs: AtomicU64::new(secs),
            }
        }

        pub fn set(&self, secs: u64) {
            self.now_secs.store(secs, Ordering::SeqCst);
        }

        pub fn advance(&self, secs: u64) {
            self.now_secs.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Duration {
            Duration::from_secs(self.now_secs.load(Ordering::SeqCst))
        }
    }
}
