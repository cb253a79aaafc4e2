use crate::core::error::StorageError;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Durable string key/value store persisted as a JSON object on disk
pub struct LocalStore {
    entries: DashMap<String, String>,
    path: Option<PathBuf>,
}

impl LocalStore {
    /// Open the store at `path`, starting empty when the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = DashMap::new();

        match fs::read_to_string(&path) {
            Ok(content) if !content.trim().is_empty() => {
                let stored: BTreeMap<String, String> = serde_json::from_str(&content)?;
                for (key, value) in stored {
                    entries.insert(key, value);
                }
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        debug!(path = %path.display(), keys = entries.len(), "Local storage opened");

        Ok(Self {
            entries,
            path: Some(path),
        })
    }

    /// Store with no backing file
    pub fn in_memory() -> Self {
        Self {
            entries: DashMap::new(),
            path: None,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.into());
        self.flush()
    }

    pub fn remove(&self, key: &str) -> Result<Option<String>, StorageError> {
        let removed = self.entries.remove(key).map(|(_, value)| value);
        self.flush()?;
        Ok(removed)
    }

    /// Write several keys with a single flush; nothing changes if the flush fails
    pub fn set_many(&self, pairs: &[(&str, String)]) -> Result<(), StorageError> {
        let previous: Vec<(&str, Option<String>)> = pairs
            .iter()
            .map(|(key, value)| (*key, self.entries.insert(key.to_string(), value.clone())))
            .collect();

        if let Err(e) = self.flush() {
            for (key, old) in previous.into_iter().rev() {
                match old {
                    Some(old) => self.entries.insert(key.to_string(), old),
                    None => self.entries.remove(key).map(|(_, value)| value),
                };
            }
            return Err(e);
        }

        Ok(())
    }

    pub fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.entries.remove(*key);
        }
        self.flush()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist to disk via a temp file and rename
    pub fn flush(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let ordered: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&ordered)?)?;
        fs::rename(&tmp, path)?;

        Ok(())
    }
}
