use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::settings::Settings;
use crate::store::SettingsError;

/// Where settings live between sessions.
pub trait SettingsBackend: Send {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&mut self) -> Result<Option<Settings>, SettingsError>;
    fn save(&mut self, settings: &Settings) -> Result<(), SettingsError>;
}

/// Keeps the last saved value in memory only.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    saved: Option<Settings>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(settings: Settings) -> Self {
        Self {
            saved: Some(settings),
        }
    }
}

impl SettingsBackend for MemoryBackend {
    fn load(&mut self) -> Result<Option<Settings>, SettingsError> {
        Ok(self.saved)
    }

    fn save(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        self.saved = Some(*settings);
        Ok(())
    }
}

/// Pretty-printed JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsBackend for JsonFileBackend {
    fn load(&mut self) -> Result<Option<Settings>, SettingsError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let settings = serde_json::from_str(&text)?;
        debug!(path = %self.path.display(), "settings loaded");
        Ok(Some(settings))
    }

    fn save(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(settings)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = JsonFileBackend::new(dir.path().join("settings.json"));
        assert_eq!(backend.load().unwrap(), None);
    }

    #[test]
    fn file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            n_back: 3,
            interval_seconds: 1,
            event_count: 20,
            highscore: 9,
        };
        JsonFileBackend::new(&path).save(&settings).unwrap();

        let mut reopened = JsonFileBackend::new(&path);
        assert_eq!(reopened.load().unwrap(), Some(settings));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileBackend::new(&path).load(),
            Err(SettingsError::Json(_))
        ));
    }
}
