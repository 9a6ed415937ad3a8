pub mod clock;
pub mod timer;

pub use clock::{ClockSink, GameClock, RunId};
pub use timer::{MonotonicTimer, Timer};
