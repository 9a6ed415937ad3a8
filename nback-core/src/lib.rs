pub mod config;
pub mod error;
pub mod phase;
pub mod state;
pub mod stimulus;
pub mod trial;

pub use config::{DEFAULT_GRID_SIZE, GameConfiguration};
pub use error::ConfigError;
pub use phase::{ClockState, GamePhase};
pub use state::{GameState, ScoreState};
pub use stimulus::{Cue, GameType, Stimulus};
pub use trial::{TrialOutcome, TrialResult};
