use nback_core::config::positive;
use nback_core::{ConfigError, GameConfiguration};
use serde::{Deserialize, Serialize};

/// Integer fields kept across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    NBack,
    IntervalSeconds,
    EventCount,
    Highscore,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::NBack,
        SettingKey::IntervalSeconds,
        SettingKey::EventCount,
        SettingKey::Highscore,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SettingKey::NBack => "n_back",
            SettingKey::IntervalSeconds => "interval_seconds",
            SettingKey::EventCount => "event_count",
            SettingKey::Highscore => "highscore",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub n_back: u32,
    pub interval_seconds: u32,
    pub event_count: u32,
    pub highscore: i32,
}

impl Default for Settings {
    fn default() -> Self {
        let config = GameConfiguration::default();
        Self {
            n_back: config.n_back,
            interval_seconds: config.interval_seconds,
            event_count: config.event_count,
            highscore: 0,
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> i64 {
        match key {
            SettingKey::NBack => self.n_back.into(),
            SettingKey::IntervalSeconds => self.interval_seconds.into(),
            SettingKey::EventCount => self.event_count.into(),
            SettingKey::Highscore => self.highscore.into(),
        }
    }

    /// Returns a copy with `key` set, or the reason `value` is unacceptable.
    pub fn with(mut self, key: SettingKey, value: i64) -> Result<Self, ConfigError> {
        let field = key.name();
        match key {
            SettingKey::NBack => self.n_back = positive_u32(field, value)?,
            SettingKey::IntervalSeconds => self.interval_seconds = positive_u32(field, value)?,
            SettingKey::EventCount => self.event_count = positive_u32(field, value)?,
            SettingKey::Highscore => {
                self.highscore =
                    i32::try_from(value).map_err(|_| ConfigError::OutOfRange { field, value })?
            }
        }
        Ok(self)
    }

    /// Overlays the stored fields onto `config`.
    pub fn apply_to(&self, config: &GameConfiguration) -> GameConfiguration {
        GameConfiguration {
            n_back: self.n_back,
            interval_seconds: self.interval_seconds,
            event_count: self.event_count,
            ..*config
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.apply_to(&GameConfiguration::default()).validate()
    }
}

fn positive_u32(field: &'static str, value: i64) -> Result<u32, ConfigError> {
    positive(field, value)?;
    u32::try_from(value).map_err(|_| ConfigError::OutOfRange { field, value })
}
