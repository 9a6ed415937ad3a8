use nback_core::{ClockState, Cue, GameConfiguration, GamePhase, GameState, GameType, ScoreState, Stimulus};
use nback_timing::RunId;

use crate::evaluator::ScoreDelta;
use crate::summary::GameSummary;

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub clock: ClockState,
    pub state: GameState,
    pub score: ScoreState,
    pub config: GameConfiguration,
    pub run: Option<RunId>,
}

/// Things that happened, in order, for consumers that act on transitions
/// (speech output, result export) rather than redraw from snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started {
        run: RunId,
        game_type: GameType,
        len: usize,
    },
    Stimulus {
        run: RunId,
        index: usize,
        stimulus: Stimulus,
        cue: Cue,
    },
    Gap {
        run: RunId,
        index: usize,
    },
    Response {
        run: RunId,
        index: Option<usize>,
        delta: ScoreDelta,
        score: i32,
    },
    Finished {
        run: RunId,
        summary: Box<GameSummary>,
    },
    Cancelled {
        run: RunId,
    },
}
