use nback_core::{ConfigError, GameType};
use nback_settings::SettingsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("no game type selected")]
    NoGameTypeSelected,
    #[error("game type {0:?} has no presentation mode")]
    UnsupportedGameType(GameType),
    #[error("configuration cannot change while a game is running")]
    GameRunning,
    #[error("settings store failed: {0}")]
    Settings(SettingsError),
}

impl From<SettingsError> for GameError {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::Rejected(config) => GameError::InvalidConfiguration(config),
            other => GameError::Settings(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
