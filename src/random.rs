/*!
Abstract source of uniformly distributed integers, used only to jitter the
delay before a unicast response to an `M-SEARCH` (`spec.md` §4.4/§8). Injected
so tests can pin the jitter to a known value instead of a random one.
*/
use rand::Rng;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

///
/// A source of jitter. `uniform(0, mx)` returns an integer in `[0, mx]`
/// inclusive; callers never pass `mx == 0` (the engine treats that as "no
/// jitter" before calling in, per the Scheduler's delayed-response rule).
///
pub trait Random: Send + Sync {
    fn uniform(&self, low: u32, high: u32) -> u32;
}

///
/// The production source, backed by the thread-local RNG.
///
#[derive(Debug, Default)]
pub struct SystemRandom;

impl Random for SystemRandom {
    fn uniform(&self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        rand::thread_rng().gen_range(low..=high)
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;

    /// A source that always returns the upper bound of the requested range,
    /// making jitter-dependent tests deterministic without making them
    /// vacuous (the full delay is still exercised, just not a random point
    /// within it).
    #[derive(Debug, Default)]
    pub struct FakeRandom;

    impl Random for FakeRandom {
        fn uniform(&self, _low: u32, high: u32) -> u32 {
            high
        }
    }
}
