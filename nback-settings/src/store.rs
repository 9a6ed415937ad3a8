use std::sync::{Mutex, MutexGuard, PoisonError};

use nback_core::ConfigError;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::{MemoryBackend, SettingsBackend};
use crate::settings::{SettingKey, Settings};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("rejected setting: {0}")]
    Rejected(#[from] ConfigError),
    #[error("settings i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent key-value settings with change notification.
///
/// Writes go through the backend first; subscribers only ever see values
/// that were saved successfully.
pub struct SettingsStore {
    backend: Mutex<Box<dyn SettingsBackend>>,
    tx: watch::Sender<Settings>,
}

impl SettingsStore {
    /// Loads from `backend`, falling back to defaults when it is empty or
    /// holds values that no longer validate.
    pub fn open(mut backend: impl SettingsBackend + 'static) -> Result<Self, SettingsError> {
        let settings = match backend.load()? {
            Some(settings) => match settings.validate() {
                Ok(()) => settings,
                Err(e) => {
                    warn!("stored settings rejected, using defaults: {}", e);
                    Settings {
                        highscore: settings.highscore,
                        ..Settings::default()
                    }
                }
            },
            None => Settings::default(),
        };
        info!(
            n_back = settings.n_back,
            interval_seconds = settings.interval_seconds,
            event_count = settings.event_count,
            highscore = settings.highscore,
            "settings ready"
        );
        let (tx, _rx) = watch::channel(settings);
        Ok(Self {
            backend: Mutex::new(Box::new(backend)),
            tx,
        })
    }

    pub fn in_memory() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let (tx, _rx) = watch::channel(settings);
        Self {
            backend: Mutex::new(Box::new(MemoryBackend::with(settings))),
            tx,
        }
    }

    pub fn current(&self) -> Settings {
        *self.tx.borrow()
    }

    pub fn get(&self, key: SettingKey) -> i64 {
        self.current().get(key)
    }

    /// Validates, persists, then notifies. The stored value is unchanged on
    /// any error, and a highscore lower than the stored one is ignored.
    pub fn set(&self, key: SettingKey, value: i64) -> Result<(), SettingsError> {
        let mut backend = self.lock_backend();
        self.write(&mut backend, key, value)?;
        Ok(())
    }

    /// Raises the stored highscore to `score` if it is higher. Returns whether
    /// it changed.
    pub fn record_highscore(&self, score: i32) -> Result<bool, SettingsError> {
        let mut backend = self.lock_backend();
        self.write(&mut backend, SettingKey::Highscore, score.into())
    }

    fn lock_backend(&self) -> MutexGuard<'_, Box<dyn SettingsBackend>> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every write happens under the backend lock, so the compare and the
    /// save cannot interleave with another writer.
    fn write(
        &self,
        backend: &mut Box<dyn SettingsBackend>,
        key: SettingKey,
        value: i64,
    ) -> Result<bool, SettingsError> {
        let current = self.current();
        if key == SettingKey::Highscore && value < i64::from(current.highscore) {
            debug!(value, highscore = current.highscore, "lower highscore ignored");
            return Ok(false);
        }
        let next = current.with(key, value)?;
        if next == current {
            return Ok(false);
        }
        backend.save(&next)?;
        self.tx.send_replace(next);
        info!(key = key.name(), value, "setting changed");
        Ok(true)
    }

    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::JsonFileBackend;

    struct FailingBackend;

    impl SettingsBackend for FailingBackend {
        fn load(&mut self) -> Result<Option<Settings>, SettingsError> {
            Ok(None)
        }

        fn save(&mut self, _settings: &Settings) -> Result<(), SettingsError> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    #[test]
    fn set_rejects_invalid_and_keeps_value() {
        let store = SettingsStore::in_memory();
        let err = store.set(SettingKey::IntervalSeconds, 0).unwrap_err();
        assert!(matches!(err, SettingsError::Rejected(_)));
        assert_eq!(store.get(SettingKey::IntervalSeconds), 2);
    }

    #[test]
    fn failed_save_does_not_notify() {
        let store = SettingsStore::open(FailingBackend).unwrap();
        let rx = store.subscribe();
        assert!(store.set(SettingKey::NBack, 4).is_err());
        assert!(!rx.has_changed().unwrap());
        assert_eq!(store.get(SettingKey::NBack), 2);
    }

    #[test]
    fn highscore_only_rises() {
        let store = SettingsStore::with_settings(Settings {
            highscore: 5,
            ..Settings::default()
        });
        assert!(!store.record_highscore(3).unwrap());
        assert_eq!(store.get(SettingKey::Highscore), 5);
        assert!(store.record_highscore(7).unwrap());
        assert_eq!(store.get(SettingKey::Highscore), 7);
    }

    #[test]
    fn highscore_cannot_be_set_lower() {
        let store = SettingsStore::with_settings(Settings {
            highscore: 7,
            ..Settings::default()
        });
        let rx = store.subscribe();
        store.set(SettingKey::Highscore, 1).unwrap();
        assert_eq!(store.get(SettingKey::Highscore), 7);
        assert!(!rx.has_changed().unwrap());

        store.set(SettingKey::Highscore, 9).unwrap();
        assert_eq!(store.get(SettingKey::Highscore), 9);
    }

    #[test]
    fn racing_highscores_keep_the_best() {
        let store = Arc::new(SettingsStore::in_memory());
        let handles: Vec<_> = (1..=32)
            .map(|score| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.record_highscore(score).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.get(SettingKey::Highscore), 32);
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let store = SettingsStore::in_memory();
        let mut rx = store.subscribe();
        store.set(SettingKey::EventCount, 30).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().event_count, 30);
    }

    #[test]
    fn file_store_round_trips_through_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        {
            let store = SettingsStore::open(JsonFileBackend::new(&path)).unwrap();
            store.set(SettingKey::NBack, 3).unwrap();
            store.record_highscore(11).unwrap();
        }
        let store = SettingsStore::open(JsonFileBackend::new(&path)).unwrap();
        assert_eq!(store.get(SettingKey::NBack), 3);
        assert_eq!(store.get(SettingKey::Highscore), 11);
    }

    #[test]
    fn invalid_file_values_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"n_back": 0, "highscore": 4}"#).unwrap();
        let store = SettingsStore::open(JsonFileBackend::new(&path)).unwrap();
        assert_eq!(store.get(SettingKey::NBack), 2);
        assert_eq!(store.get(SettingKey::Highscore), 4);
    }
}
