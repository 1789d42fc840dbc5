//! Saving and restoring timer state through a pluggable key-value medium.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{StorageError, TimerError};
use crate::options::PersistOptions;
use crate::state::TimerState;

const KEY_PREFIX: &str = "timer-store-";

/// Storage key for a timer id.
pub fn storage_key(id: &str) -> String {
    format!("{}{}", KEY_PREFIX, id)
}

/// A key-value medium holding serialized blobs.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn io_err(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(&path, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        let path = self.path_for(key);
        // Write beside the target and rename so a crash never leaves half a blob.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| io_err(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(&path, e)),
        }
    }
}

/// Which medium a persisted timer writes to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    File { dir: PathBuf },
}

impl StorageKind {
    pub fn open(&self) -> Box<dyn Storage> {
        match self {
            StorageKind::Memory => Box::new(MemoryStorage::new()),
            StorageKind::File { dir } => Box::new(FileStorage::new(dir.clone())),
        }
    }
}

/// A timer's binding to its storage key.
pub struct Persistence {
    key: String,
    storage: Box<dyn Storage>,
}

impl Persistence {
    pub fn new(id: &str, storage: Box<dyn Storage>) -> Self {
        Self {
            key: storage_key(id),
            storage,
        }
    }

    pub fn from_options(opts: &PersistOptions) -> Self {
        Self::new(&opts.id, opts.storage.open())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored state. A blob that no longer decodes, or decodes to an
    /// inconsistent state, is reported and treated as missing.
    pub fn load(&self) -> Result<Option<TimerState>, TimerError> {
        let Some(blob) = self.storage.get(&self.key)? else {
            return Ok(None);
        };
        match serde_json::from_str::<TimerState>(&blob) {
            Ok(state) if state.is_consistent() => Ok(Some(state)),
            Ok(_) => {
                log::warn!("Ignoring inconsistent timer state under {}", self.key);
                Ok(None)
            }
            Err(e) => {
                log::warn!("Ignoring unreadable timer state under {}: {}", self.key, e);
                Ok(None)
            }
        }
    }

    pub fn save(&mut self, state: &TimerState) -> Result<(), TimerError> {
        let blob = serde_json::to_string(state)?;
        self.storage.set(&self.key, &blob)?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), TimerError> {
        self.storage.remove(&self.key)?;
        Ok(())
    }
}
