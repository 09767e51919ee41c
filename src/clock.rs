//! Virtual time. Production code ticks at one tick per wall-clock second;
//! tests shrink the tick so multi-second scenarios finish in milliseconds
//! while still exercising real thread interleaving, rather than faking
//! time advancement with no delay at all.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct VirtualClock {
    start: Instant,
    tick: Duration,
}

impl VirtualClock {
    pub fn new(tick: Duration) -> Self {
        Self {
            start: Instant::now(),
            tick,
        }
    }

    pub fn real_time() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Ticks elapsed since this clock was created.
    pub fn now(&self) -> u64 {
        (self.start.elapsed().as_nanos() / self.tick.as_nanos().max(1)) as u64
    }

    /// Blocks the calling thread for `ticks` virtual seconds.
    pub fn sleep(&self, ticks: u64) {
        if ticks > 0 {
            std::thread::sleep(self.tick * ticks as u32);
        }
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::real_time()
    }
}
