use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// Key of the persisted LLM provider/model preference
pub const LLM_PREFERENCE_KEY: &str = "llm_preference";

/// Error type for durable state operations
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("state store is read-only")]
    ReadOnly,
}

/// Durable key/value storage for client-side state.
///
/// Values are opaque JSON documents; callers own their shape.
pub trait KvStore: Send {
    fn read(&self, key: &str) -> Result<Option<String>, StateError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StateError>;
}

/// One JSON file per key in a state directory
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileKvStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KvStore for FileKvStore {
    fn read(&self, key: &str) -> Result<Option<String>, StateError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StateError::ReadError { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StateError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir).map_err(|source| StateError::WriteError {
            path: self.dir.clone(),
            source,
        })?;
        atomic_write(&path, value.as_bytes())
            .map_err(|source| StateError::WriteError { path, source })
    }
}

/// In-memory store, for tests and `--ephemeral` sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: BTreeMap<String, String>,
    read_only: bool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail
    pub fn read_only() -> Self {
        MemoryKvStore {
            entries: BTreeMap::new(),
            read_only: true,
        }
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KvStore for MemoryKvStore {
    fn read(&self, key: &str) -> Result<Option<String>, StateError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StateError> {
        if self.read_only {
            return Err(StateError::ReadOnly);
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read a JSON record, treating missing, unreadable or corrupt data as absent.
pub fn read_record<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Option<T> {
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "could not read stored record");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed stored record");
            None
        }
    }
}

pub fn write_record<T: Serialize>(
    store: &mut dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StateError> {
    let content = serde_json::to_string_pretty(value)?;
    store.write(key, &content)
}

/// Last provider/model pair the user picked for LLM-backed actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmPreference {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub model: String,
}

impl LlmPreference {
    pub fn load(store: &dyn KvStore) -> LlmPreference {
        read_record(store, LLM_PREFERENCE_KEY).unwrap_or_default()
    }

    /// Persist the preference; failures are logged and dropped.
    pub fn save(&self, store: &mut dyn KvStore) {
        if let Err(e) = write_record(store, LLM_PREFERENCE_KEY, self) {
            tracing::warn!(error = %e, "could not save provider preference");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.provider.is_empty() && self.model.is_empty()
    }
}
