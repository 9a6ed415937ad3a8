use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which channel the sequence is presented on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    NoSelection,
    Audio,
    #[default]
    Visual,
    AudioVisual,
}

impl GameType {
    pub fn is_selected(&self) -> bool {
        !matches!(self, GameType::NoSelection)
    }

    /// Turns a stimulus into what the presentation layer shows or speaks.
    /// `None` when this game type has no single-channel presentation.
    pub fn cue(&self, stimulus: Stimulus, grid_size: u8) -> Option<Cue> {
        match self {
            GameType::Audio => Some(Cue::Spoken(stimulus.letter())),
            GameType::Visual => {
                let (row, col) = stimulus.grid_cell(grid_size);
                Some(Cue::Grid { row, col })
            }
            GameType::AudioVisual | GameType::NoSelection => None,
        }
    }
}

/// One presented value, `1..=grid_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stimulus(u8);

impl Stimulus {
    pub fn new(value: u8, grid_size: u8) -> Result<Self, ConfigError> {
        if value == 0 || value > grid_size {
            return Err(ConfigError::StimulusOutOfRange { value, grid_size });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Letter spoken in audio mode: 1 is 'A', 9 is 'I'.
    pub fn letter(&self) -> char {
        (b'A' + (self.0 - 1)) as char
    }

    /// Row and column on the smallest square grid holding `grid_size` cells.
    pub fn grid_cell(&self, grid_size: u8) -> (u8, u8) {
        let side = grid_side(grid_size);
        let offset = self.0 - 1;
        (offset / side, offset % side)
    }
}

impl std::fmt::Display for Stimulus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn grid_side(grid_size: u8) -> u8 {
    let mut side = 1u8;
    while u16::from(side) * u16::from(side) < u16::from(grid_size) {
        side += 1;
    }
    side
}

/// Presentation of a stimulus for one game type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    Spoken(char),
    Grid { row: u8, col: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_one_to_a() {
        let first = Stimulus::new(1, 9).unwrap();
        let last = Stimulus::new(9, 9).unwrap();
        assert_eq!(first.letter(), 'A');
        assert_eq!(last.letter(), 'I');
    }

    #[test]
    fn grid_cells_fill_row_major() {
        assert_eq!(Stimulus::new(1, 9).unwrap().grid_cell(9), (0, 0));
        assert_eq!(Stimulus::new(5, 9).unwrap().grid_cell(9), (1, 1));
        assert_eq!(Stimulus::new(9, 9).unwrap().grid_cell(9), (2, 2));
        assert_eq!(grid_side(5), 3);
    }

    #[test]
    fn out_of_domain_rejected() {
        assert!(Stimulus::new(0, 9).is_err());
        assert!(Stimulus::new(10, 9).is_err());
    }

    #[test]
    fn audio_visual_has_no_cue() {
        let stim = Stimulus::new(3, 9).unwrap();
        assert_eq!(GameType::Audio.cue(stim, 9), Some(Cue::Spoken('C')));
        assert_eq!(GameType::Visual.cue(stim, 9), Some(Cue::Grid { row: 0, col: 2 }));
        assert_eq!(GameType::AudioVisual.cue(stim, 9), None);
        assert!(!GameType::NoSelection.is_selected());
    }
}
