//! String-keyed preference storage for settings that outlive the process.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use puddle_core::PuddleError;
use serde_json::{Map, Value};
use tracing::warn;

/// Key under which the rain preference is stored.
pub const RAIN_PREFERENCE_KEY: &str = "puddle.rain-enabled";

/// A flat string-to-string preference store.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PuddleError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PuddleError>;
}

/// Reads the rain preference. Missing, unreadable or unrecognised values
/// all mean disabled.
pub fn read_rain_preference(store: &dyn PreferenceStore) -> bool {
    match store.get(RAIN_PREFERENCE_KEY) {
        Ok(value) => value.as_deref() == Some("true"),
        Err(e) => {
            warn!(error = %e, "could not read rain preference; defaulting to off");
            false
        }
    }
}

/// Persists the rain preference as `"true"` or `"false"`.
pub fn write_rain_preference(
    store: &mut dyn PreferenceStore,
    enabled: bool,
) -> Result<(), PuddleError> {
    store.set(RAIN_PREFERENCE_KEY, if enabled { "true" } else { "false" })
}

/// In-process store, for tests and hosts without persistence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PuddleError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PuddleError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// A store backed by one JSON object file.
///
/// A missing file reads as empty. A file that is not a JSON object is
/// treated as empty (with a warning) and replaced on the next write.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, PuddleError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(PuddleError::Io(format!("{}: {e}", self.path.display()))),
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "preference file is not a JSON object; ignoring it");
                Ok(Map::new())
            }
        }
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PuddleError> {
        Ok(self
            .load()?
            .get(key)
            .and_then(Value::as_str)
            .map(String::from))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PuddleError> {
        let mut map = self.load()?;
        map.insert(key.to_owned(), Value::String(value.to_owned()));
        let text = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| PuddleError::Preference(e.to_string()))?;
        fs::write(&self.path, text)
            .map_err(|e| PuddleError::Io(format!("{}: {e}", self.path.display())))
    }
}
