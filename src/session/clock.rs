use std::time::{Duration, Instant};

use crate::foundation::core::TickRate;

/// Simulated clock: tick `k` happens at `k / rate` seconds.
#[derive(Clone, Copy, Debug)]
pub struct TickClock {
    rate: TickRate,
    next: u64,
}

impl TickClock {
    pub fn new(rate: TickRate) -> Self {
        Self { rate, next: 0 }
    }

    /// Next tick index and its time.
    pub fn advance(&mut self) -> (u64, Duration) {
        let tick = self.next;
        self.next += 1;
        (tick, self.rate.ticks_to_time(tick))
    }

    pub fn ticks(&self) -> u64 {
        self.next
    }
}

/// Paces a simulated clock against the wall clock.
#[derive(Debug)]
pub struct RealtimePacer {
    clock: TickClock,
    started: Instant,
}

impl RealtimePacer {
    pub fn new(rate: TickRate) -> Self {
        Self {
            clock: TickClock::new(rate),
            started: Instant::now(),
        }
    }

    /// Sleep until the next tick is due, then return it. Late ticks are not skipped.
    pub fn wait_next(&mut self) -> (u64, Duration) {
        let (tick, at) = self.clock.advance();
        let elapsed = self.started.elapsed();
        if at > elapsed {
            std::thread::sleep(at - elapsed);
        } else if elapsed - at > Duration::from_millis(250) {
            tracing::trace!(tick, behind_ms = (elapsed - at).as_millis() as u64, "render loop behind");
        }
        (tick, at)
    }
}
