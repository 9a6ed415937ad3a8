pub mod config;
pub mod error;
pub mod evaluator;
pub mod event;
pub mod generator;
pub mod session;
pub mod state;
pub mod summary;

pub use config::GameOptions;
pub use error::{GameError, Result};
pub use evaluator::{MatchEvaluator, ScoreDelta};
pub use event::{GameEvent, GameSnapshot};
pub use generator::{Sequence, SequenceGenerator, expected_matches};
pub use session::GameSession;
pub use state::GameStateMachine;
pub use summary::GameSummary;
