use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of distinct stimuli: nine grid cells, or the letters A..=I.
pub const DEFAULT_GRID_SIZE: u8 = 9;

/// Parameters read at every game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfiguration {
    pub n_back: u32,
    pub interval_seconds: u32,
    pub event_count: u32,
    pub grid_size: u8,
}

impl Default for GameConfiguration {
    fn default() -> Self {
        Self {
            n_back: 2,
            interval_seconds: 2,
            event_count: 10,
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

impl GameConfiguration {
    /// Checks the fields a player can change.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("n_back", self.n_back.into())?;
        positive("interval_seconds", self.interval_seconds.into())?;
        positive("event_count", self.event_count.into())?;
        Ok(())
    }

    /// Checks everything sequence generation depends on.
    pub fn validate_for_generation(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.event_count <= self.n_back {
            return Err(ConfigError::MatchDistanceTooLarge {
                n_back: self.n_back,
                event_count: self.event_count,
            });
        }
        if self.grid_size < 2 {
            return Err(ConfigError::GridTooSmall(self.grid_size));
        }
        Ok(())
    }
}

/// Shared check for every "at least one" setting.
pub fn positive(field: &'static str, value: i64) -> Result<(), ConfigError> {
    if value < 1 {
        Err(ConfigError::NonPositive { field, value })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = GameConfiguration::default();
        assert!(config.validate().is_ok());
        assert!(config.validate_for_generation().is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = GameConfiguration {
            interval_seconds: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "interval_seconds",
                value: 0
            })
        );
    }

    #[test]
    fn event_count_must_exceed_n() {
        let config = GameConfiguration {
            n_back: 3,
            event_count: 3,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(
            config.validate_for_generation(),
            Err(ConfigError::MatchDistanceTooLarge {
                n_back: 3,
                event_count: 3
            })
        );
    }
}
