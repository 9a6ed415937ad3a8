use serde::{Deserialize, Serialize};

/// Top-level game phases. `Finished` is transient: the game falls back to
/// `NotStarted` once the highscore is settled.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    NotStarted,
    Running,
    Finished,
}

impl GamePhase {
    pub fn allows_input(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn accepts_configuration(&self) -> bool {
        matches!(self, Self::NotStarted)
    }

    pub fn next(&self) -> Self {
        use GamePhase::*;
        match self {
            NotStarted => Running,
            Running => Finished,
            Finished => NotStarted,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Position of the clock within one pass over the sequence.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockState {
    #[default]
    Idle,
    Presenting(usize),
    Gap(usize),
    Finished,
}

impl ClockState {
    /// The state following this one in a run of `len` steps.
    pub fn advance(&self, len: usize) -> Self {
        match *self {
            ClockState::Idle if len == 0 => ClockState::Finished,
            ClockState::Idle => ClockState::Presenting(0),
            ClockState::Presenting(i) => ClockState::Gap(i),
            ClockState::Gap(i) if i + 1 < len => ClockState::Presenting(i + 1),
            ClockState::Gap(_) | ClockState::Finished => ClockState::Finished,
        }
    }
}
