use std::time::Duration;
use tokio::time::Instant;

/// Trait for game timers
pub trait Timer: Clone + Send + Sync {
    type Timestamp: Copy + Clone + Send + Sync;
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
}

/// Nanoseconds since creation, on tokio's clock so paused test runtimes
/// see the same time as the game clock.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTimer {
    pub start: Instant,
}

impl Timer for MonotonicTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
}

impl MonotonicTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn follows_paused_clock() {
        let timer = MonotonicTimer::new();
        let before = timer.now();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let elapsed = timer.elapsed(before);
        assert!(elapsed >= Duration::from_millis(1500));
        assert!(elapsed < Duration::from_millis(1510));
    }
}
