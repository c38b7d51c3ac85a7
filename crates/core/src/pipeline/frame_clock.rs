use std::time::Instant;

/// Source of the timestamps used to measure per-frame processing cost.
pub trait FrameClock: Send {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl FrameClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
