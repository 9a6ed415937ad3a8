use nback_core::GameType;

use crate::generator::DEFAULT_MATCH_PERCENT;

/// Engine tuning that is not part of the persisted settings.
#[derive(Debug, Clone)]
pub struct GameOptions {
    /// Fixed seed for reproducible sequences; random when `None`.
    pub seed: Option<u64>,
    pub game_type: GameType,
    pub wrong_guess_duration_ms: u64,
    pub match_percent: u8,
    pub event_capacity: usize,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            seed: None,
            game_type: GameType::Visual,
            wrong_guess_duration_ms: 500,
            match_percent: DEFAULT_MATCH_PERCENT,
            event_capacity: 64,
        }
    }
}
