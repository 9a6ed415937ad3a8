use thiserror::Error;

/// Rejected configuration value
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be at least 1, got {value}")]
    NonPositive { field: &'static str, value: i64 },
    #[error("event count {event_count} must exceed n-back distance {n_back}")]
    MatchDistanceTooLarge { n_back: u32, event_count: u32 },
    #[error("grid size {0} is too small, need at least 2 stimuli")]
    GridTooSmall(u8),
    #[error("sequence uses {actual} stimuli but the game is set up for {expected}")]
    GridMismatch { expected: u8, actual: u8 },
    #[error("stimulus {value} outside domain 1..={grid_size}")]
    StimulusOutOfRange { value: u8, grid_size: u8 },
    #[error("value {value} for {field} does not fit")]
    OutOfRange { field: &'static str, value: i64 },
}
