use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use nback_core::{ClockState, ConfigError, GameConfiguration, GamePhase, GameState, GameType, ScoreState};
use nback_settings::{SettingKey, Settings, SettingsStore};
use nback_timing::{ClockSink, GameClock, MonotonicTimer, RunId, Timer};
use rand::rngs::StdRng;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::GameOptions;
use crate::error::{GameError, Result};
use crate::evaluator::ScoreDelta;
use crate::event::{GameEvent, GameSnapshot};
use crate::generator::{Sequence, SequenceGenerator};
use crate::session::GameSession;
use crate::summary::GameSummary;

struct Inner {
    phase: GamePhase,
    clock_state: ClockState,
    config: GameConfiguration,
    state: GameState,
    score: ScoreState,
    /// Settings that changed while a run was active.
    pending: Option<Settings>,
    last_run: RunId,
    session: Option<GameSession>,
    clock: GameClock,
    generator: SequenceGenerator<StdRng>,
    wrong_guess_token: u64,
    last_summary: Option<GameSummary>,
}

impl Inner {
    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            clock: self.clock_state,
            state: self.state,
            score: self.score,
            config: self.config,
            run: self.session.as_ref().map(GameSession::run),
        }
    }

    fn live_run(&self) -> Option<RunId> {
        if self.phase.is_running() {
            self.session.as_ref().map(GameSession::run)
        } else {
            None
        }
    }

    fn ensure_configurable(&self) -> Result<()> {
        if self.phase.accepts_configuration() {
            Ok(())
        } else {
            Err(GameError::GameRunning)
        }
    }

    fn apply_settings(&mut self, settings: Settings) {
        match settings.validate() {
            Ok(()) => self.config = settings.apply_to(&self.config),
            Err(e) => warn!("ignoring stored settings: {}", e),
        }
        self.score.highscore = self.score.highscore.max(settings.highscore);
    }

    fn apply_pending(&mut self) {
        if let Some(settings) = self.pending.take() {
            debug!("applying settings queued during the run");
            self.apply_settings(settings);
        }
    }

    /// Back to a quiet `NotStarted` with nothing on screen.
    fn settle(&mut self) {
        self.phase = GamePhase::NotStarted;
        self.clock_state = ClockState::Idle;
        self.state.current_stimulus = None;
        self.state.wrong_guess = false;
        self.apply_pending();
    }
}

struct Shared {
    inner: Mutex<Inner>,
    settings: Arc<SettingsStore>,
    snapshots: watch::Sender<GameSnapshot>,
    events: broadcast::Sender<GameEvent>,
    timer: MonotonicTimer,
    wrong_guess_duration: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.snapshots.send_replace(inner.snapshot());
    }

    fn emit(&self, event: GameEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn settings_changed(&self, settings: Settings) {
        let mut inner = self.lock();
        if inner.phase.is_running() {
            debug!("settings change queued until the run ends");
            inner.pending = Some(settings);
            return;
        }
        inner.apply_settings(settings);
        self.publish(&inner);
    }

    /// Stops the live run without touching the highscore.
    fn abort_run(&self, inner: &mut Inner) -> Option<RunId> {
        let run = inner.live_run()?;
        inner.clock.cancel();
        inner.session = None;
        inner.settle();
        info!(%run, "game cancelled");
        self.emit(GameEvent::Cancelled { run });
        Some(run)
    }

    fn clear_wrong_guess(&self, run: RunId, token: u64) -> bool {
        let mut inner = self.lock();
        if inner.wrong_guess_token != token || inner.live_run() != Some(run) {
            debug!(%run, token, "stale wrong-guess clear ignored");
            return false;
        }
        inner.state.wrong_guess = false;
        self.publish(&inner);
        true
    }

    fn finish(&self, mut inner: MutexGuard<'_, Inner>, run: RunId) {
        let Some(session) = inner.session.take() else {
            return;
        };
        inner.phase = GamePhase::Finished;
        inner.clock_state = ClockState::Finished;
        inner.state.current_stimulus = None;
        inner.state.wrong_guess = false;
        self.publish(&inner);

        let score = inner.score.score;
        let previous = inner.score.highscore;
        let summary = GameSummary::new(
            run,
            inner.state.game_type,
            session.config(),
            session.results(),
            score,
            previous,
        );
        if inner.score.beats_highscore() {
            inner.score.highscore = score;
        }
        inner.settle();
        inner.last_summary = Some(summary.clone());
        self.publish(&inner);
        drop(inner);

        info!(%run, score, previous_highscore = previous, "game finished");
        if summary.new_highscore {
            match self.settings.record_highscore(score) {
                Ok(_) => info!(score, "new highscore saved"),
                Err(e) => error!("failed to save highscore {}: {}", score, e),
            }
        }
        self.emit(GameEvent::Finished {
            run,
            summary: Box::new(summary),
        });
    }
}

impl ClockSink for Shared {
    fn on_tick(&self, run: RunId, state: ClockState) -> bool {
        let mut inner = self.lock();
        if inner.live_run() != Some(run) {
            return false;
        }
        inner.clock_state = state;
        match state {
            ClockState::Presenting(index) => {
                let now = self.timer.now();
                let game_type = inner.state.game_type;
                let grid_size = inner.config.grid_size;
                let stimulus = inner
                    .session
                    .as_mut()
                    .and_then(|session| session.present(index, now));
                let presented = stimulus.and_then(|s| game_type.cue(s, grid_size).map(|cue| (s, cue)));
                let Some((stimulus, cue)) = presented else {
                    error!(%run, index, ?game_type, "nothing to present, ending run");
                    self.abort_run(&mut inner);
                    self.publish(&inner);
                    return false;
                };
                inner.state.current_stimulus = Some(stimulus);
                debug!(%run, index, %stimulus, ?cue, "stimulus");
                self.publish(&inner);
                self.emit(GameEvent::Stimulus {
                    run,
                    index,
                    stimulus,
                    cue,
                });
            }
            ClockState::Gap(index) => {
                inner.state.current_stimulus = None;
                self.publish(&inner);
                self.emit(GameEvent::Gap { run, index });
            }
            ClockState::Finished => self.finish(inner, run),
            ClockState::Idle => {}
        }
        true
    }
}

/// Top-level N-back game: `NotStarted → Running → Finished → NotStarted`.
///
/// Commands may come from any thread, but the machine spawns tokio tasks
/// (clock, settings watcher, wrong-guess reset), so it has to be created and
/// driven inside a tokio runtime.
pub struct GameStateMachine {
    shared: Arc<Shared>,
    watcher: JoinHandle<()>,
}

impl GameStateMachine {
    pub fn new(settings: Arc<SettingsStore>, options: GameOptions) -> Self {
        // subscribe before anything can write, so no change goes unseen
        let updates = settings.subscribe();
        let stored = settings.current();
        let config = stored.apply_to(&GameConfiguration::default());
        let generator = match options.seed {
            Some(seed) => SequenceGenerator::seeded(seed),
            None => SequenceGenerator::from_entropy(),
        }
        .with_match_percent(options.match_percent);

        let inner = Inner {
            phase: GamePhase::NotStarted,
            clock_state: ClockState::Idle,
            config,
            state: GameState {
                game_type: options.game_type,
                ..GameState::default()
            },
            score: ScoreState {
                score: 0,
                highscore: stored.highscore,
            },
            pending: None,
            last_run: RunId::default(),
            session: None,
            clock: GameClock::new(),
            generator,
            wrong_guess_token: 0,
            last_summary: None,
        };
        let (snapshots, _) = watch::channel(inner.snapshot());
        let (events, _) = broadcast::channel(options.event_capacity.max(1));
        let shared = Arc::new(Shared {
            inner: Mutex::new(inner),
            settings,
            snapshots,
            events,
            timer: MonotonicTimer::new(),
            wrong_guess_duration: Duration::from_millis(options.wrong_guess_duration_ms),
        });
        let watcher = tokio::spawn(watch_settings(Arc::downgrade(&shared), updates));

        Self { shared, watcher }
    }

    pub fn set_game_type(&self, game_type: GameType) -> Result<()> {
        let mut inner = self.shared.lock();
        inner.ensure_configurable()?;
        inner.state.game_type = game_type;
        debug!(?game_type, "game type selected");
        self.shared.publish(&inner);
        Ok(())
    }

    pub fn set_n_back(&self, n_back: u32) -> Result<()> {
        self.set_setting(SettingKey::NBack, n_back.into())
    }

    pub fn set_interval_seconds(&self, seconds: u32) -> Result<()> {
        self.set_setting(SettingKey::IntervalSeconds, seconds.into())
    }

    pub fn set_event_count(&self, count: u32) -> Result<()> {
        self.set_setting(SettingKey::EventCount, count.into())
    }

    fn set_setting(&self, key: SettingKey, value: i64) -> Result<()> {
        let mut inner = self.shared.lock();
        inner.ensure_configurable()?;
        self.shared.settings.set(key, value)?;
        inner.config = self.shared.settings.current().apply_to(&inner.config);
        self.shared.publish(&inner);
        Ok(())
    }

    /// Starts a game on a freshly generated sequence, cancelling any run in
    /// progress first.
    pub fn start(&self) -> Result<RunId> {
        self.launch(None)
    }

    /// Starts a game on a given sequence instead of a generated one.
    pub fn start_with_sequence(&self, sequence: Sequence) -> Result<RunId> {
        self.launch(Some(sequence))
    }

    fn launch(&self, sequence: Option<Sequence>) -> Result<RunId> {
        let mut inner = self.shared.lock();
        let game_type = inner.state.game_type;
        if !game_type.is_selected() {
            return Err(GameError::NoGameTypeSelected);
        }
        if self.shared.abort_run(&mut inner).is_some() {
            self.shared.publish(&inner);
        }
        match game_type {
            GameType::Audio | GameType::Visual => {}
            GameType::AudioVisual => {
                warn!(?game_type, "game type has no presentation mode");
                return Err(GameError::UnsupportedGameType(game_type));
            }
            GameType::NoSelection => return Err(GameError::NoGameTypeSelected),
        }

        // the store is authoritative at every start, queued copies included
        inner.pending = None;
        let stored = self.shared.settings.current();
        inner.apply_settings(stored);
        let config = inner.config;
        let sequence = match sequence {
            Some(sequence) if sequence.grid_size() != config.grid_size => {
                return Err(ConfigError::GridMismatch {
                    expected: config.grid_size,
                    actual: sequence.grid_size(),
                }
                .into());
            }
            Some(sequence) => sequence,
            None => inner.generator.generate(&config)?,
        };

        let run = inner.last_run.next();
        inner.last_run = run;
        let len = sequence.len();
        debug!(%run, sequence = ?sequence.values(), "sequence ready");
        inner.session = Some(GameSession::new(run, sequence, config));
        inner.score.score = 0;
        inner.state.current_stimulus = None;
        inner.state.wrong_guess = false;
        inner.clock_state = ClockState::Idle;
        inner.phase = GamePhase::Running;
        let interval = Duration::from_secs(config.interval_seconds.into());
        inner.clock.start(run, len, interval, Arc::clone(&self.shared));

        info!(%run, ?game_type, n_back = config.n_back, len, "game started");
        self.shared.publish(&inner);
        self.shared.emit(GameEvent::Started {
            run,
            game_type,
            len,
        });
        Ok(run)
    }

    /// Registers the player's "match" signal for the stimulus on screen.
    pub fn submit_match(&self) -> ScoreDelta {
        let mut inner = self.shared.lock();
        if !inner.phase.allows_input() {
            return ScoreDelta::Ignored;
        }
        let now = self.shared.timer.now();
        let Some(session) = inner.session.as_mut() else {
            return ScoreDelta::Ignored;
        };
        let run = session.run();
        let index = session.current_index();
        let delta = session.match_signal(now);
        if delta == ScoreDelta::Ignored {
            return delta;
        }

        inner.score.score += delta.value();
        let score = inner.score.score;
        if delta == ScoreDelta::Penalty {
            inner.wrong_guess_token += 1;
            inner.state.wrong_guess = true;
            let token = inner.wrong_guess_token;
            let shared = Arc::clone(&self.shared);
            tokio::spawn(async move {
                tokio::time::sleep(shared.wrong_guess_duration).await;
                shared.clear_wrong_guess(run, token);
            });
        }
        debug!(%run, ?index, ?delta, score, "match signal");
        self.shared.publish(&inner);
        self.shared.emit(GameEvent::Response {
            run,
            index,
            delta,
            score,
        });
        delta
    }

    /// Stops the current run, if any. The score is kept on screen but the
    /// highscore is not touched.
    pub fn cancel(&self) -> Option<RunId> {
        let mut inner = self.shared.lock();
        let run = self.shared.abort_run(&mut inner)?;
        self.shared.publish(&inner);
        Some(run)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.shared.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<GameEvent> {
        self.shared.events.subscribe()
    }

    pub fn last_summary(&self) -> Option<GameSummary> {
        self.shared.lock().last_summary.clone()
    }

    pub fn config(&self) -> GameConfiguration {
        self.shared.lock().config
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().phase.is_running()
    }
}

impl Drop for GameStateMachine {
    fn drop(&mut self) {
        self.watcher.abort();
        self.shared.lock().clock.cancel();
    }
}

async fn watch_settings(shared: Weak<Shared>, mut rx: watch::Receiver<Settings>) {
    while rx.changed().await.is_ok() {
        let settings = *rx.borrow_and_update();
        let Some(shared) = shared.upgrade() else {
            break;
        };
        shared.settings_changed(settings);
    }
}
