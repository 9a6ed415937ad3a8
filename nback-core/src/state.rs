use serde::{Deserialize, Serialize};

use crate::stimulus::{GameType, Stimulus};

/// What the presentation layer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameState {
    pub game_type: GameType,
    /// `None` between stimuli and whenever no game runs.
    pub current_stimulus: Option<Stimulus>,
    /// Set on a wrong match, cleared again shortly after.
    pub wrong_guess: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: i32,
    pub highscore: i32,
}

impl ScoreState {
    pub fn beats_highscore(&self) -> bool {
        self.score > self.highscore
    }
}
