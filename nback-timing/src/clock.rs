use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use nback_core::ClockState;
use tokio::task::JoinHandle;
use tracing::debug;

/// Generation token of one clock run. Every new game gets a larger one, so
/// delayed work can tell whether the run it was scheduled for is still live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RunId(u64);

impl RunId {
    pub fn next(self) -> Self {
        RunId(self.0 + 1)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

/// Receives the clock's state changes.
pub trait ClockSink: Send + Sync + 'static {
    /// Publishes `state` for `run`. Returning `false` means the run is stale
    /// and the clock stops without further ticks.
    fn on_tick(&self, run: RunId, state: ClockState) -> bool;
}

struct ActiveRun {
    run: RunId,
    task: JoinHandle<()>,
}

/// Drives one pass over a sequence: each index is presented for one
/// interval, followed by a blank gap of the same length.
///
/// At most one run is active; starting another aborts the previous task.
/// Must be used from within a tokio runtime.
#[derive(Default)]
pub struct GameClock {
    active: Option<ActiveRun>,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<S: ClockSink>(&mut self, run: RunId, len: usize, interval: Duration, sink: Arc<S>) {
        self.cancel();
        debug!(%run, len, interval_ms = interval.as_millis() as u64, "clock started");
        let task = tokio::spawn(drive(run, len, interval, sink));
        self.active = Some(ActiveRun { run, task });
    }

    /// Aborts the active run, if any, and returns its id.
    pub fn cancel(&mut self) -> Option<RunId> {
        let active = self.active.take()?;
        if !active.task.is_finished() {
            active.task.abort();
            debug!(run = %active.run, "clock cancelled");
        }
        Some(active.run)
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.task.is_finished())
    }

    pub fn active_run(&self) -> Option<RunId> {
        self.active.as_ref().map(|active| active.run)
    }
}

impl Drop for GameClock {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn drive<S: ClockSink>(run: RunId, len: usize, interval: Duration, sink: Arc<S>) {
    let mut state = ClockState::Idle;
    loop {
        state = state.advance(len);
        if !sink.on_tick(run, state) {
            debug!(%run, ?state, "clock run superseded");
            return;
        }
        if state == ClockState::Finished {
            return;
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Default)]
    struct Recorder {
        ticks: Mutex<Vec<(RunId, ClockState, Instant)>>,
        live: Mutex<Option<RunId>>,
    }

    impl ClockSink for Recorder {
        fn on_tick(&self, run: RunId, state: ClockState) -> bool {
            let live = *self.live.lock().unwrap();
            if live.is_some_and(|live| live != run) {
                return false;
            }
            self.ticks.lock().unwrap().push((run, state, Instant::now()));
            true
        }
    }

    fn states(recorder: &Recorder) -> Vec<(RunId, ClockState)> {
        recorder
            .ticks
            .lock()
            .unwrap()
            .iter()
            .map(|(run, state, _)| (*run, *state))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn presents_each_index_then_gap() {
        let recorder = Arc::new(Recorder::default());
        let mut clock = GameClock::new();
        let run = RunId::default().next();
        let began = Instant::now();
        clock.start(run, 2, Duration::from_secs(1), recorder.clone());

        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(
            states(&recorder),
            vec![
                (run, ClockState::Presenting(0)),
                (run, ClockState::Gap(0)),
                (run, ClockState::Presenting(1)),
                (run, ClockState::Gap(1)),
                (run, ClockState::Finished),
            ]
        );
        let ticks = recorder.ticks.lock().unwrap();
        let finished_at = ticks.last().unwrap().2;
        assert!(finished_at - began >= Duration::from_secs(4));
        assert!(finished_at - began < Duration::from_secs(5));
        drop(ticks);
        assert!(!clock.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_aborts_previous_run() {
        let recorder = Arc::new(Recorder::default());
        let mut clock = GameClock::new();
        let first = RunId::default().next();
        clock.start(first, 5, Duration::from_secs(1), recorder.clone());
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let second = first.next();
        *recorder.live.lock().unwrap() = Some(second);
        clock.start(second, 1, Duration::from_secs(1), recorder.clone());
        assert_eq!(clock.active_run(), Some(second));

        tokio::time::sleep(Duration::from_secs(10)).await;

        let seen = states(&recorder);
        let after_restart: Vec<_> = seen.iter().skip_while(|(run, _)| *run == first).collect();
        assert!(after_restart.iter().all(|(run, _)| *run == second));
        assert_eq!(seen.last(), Some(&(second, ClockState::Finished)));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_sink_stops_run() {
        let recorder = Arc::new(Recorder::default());
        *recorder.live.lock().unwrap() = Some(RunId::default());
        let mut clock = GameClock::new();
        clock.start(RunId::default().next(), 3, Duration::from_secs(1), recorder.clone());

        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(states(&recorder).is_empty());
        assert!(!clock.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_returns_run_and_stops_ticks() {
        let recorder = Arc::new(Recorder::default());
        let mut clock = GameClock::new();
        let run = RunId::default().next();
        clock.start(run, 3, Duration::from_secs(1), recorder.clone());
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(clock.cancel(), Some(run));
        let before = states(&recorder).len();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(states(&recorder).len(), before);
        assert_eq!(clock.cancel(), None);
    }
}
