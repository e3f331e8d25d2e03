use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

use mangashelf_lib::error::{Error, Result};
use serde_json::Value;

/// A JSON key/value store, the persistence capability the library is built
/// on. Implementations decide where values live; callers only see keys.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&self, key: &str, value: Value) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

fn poisoned<T>(_: T) -> Error {
    Error::Store("store lock poisoned".to_string())
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}

/// Keeps every key in one JSON document on disk, rewritten on each change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: RwLock<HashMap<String, Value>>,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = PathBuf::new().join(path);

        let values = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(values) => values,
                Err(e) => {
                    let backup = sibling(&path, "bak");
                    warn!(
                        "unreadable store {}: {e}, moving it to {}",
                        path.display(),
                        backup.display()
                    );
                    std::fs::rename(&path, &backup)
                        .map_err(|e| Error::Store(format!("{}: {e}", backup.display())))?;
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("creating new store at {}", path.display());
                HashMap::new()
            }
            Err(e) => return Err(Error::Store(format!("{}: {e}", path.display()))),
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Written to a `.tmp` sibling, then renamed over the document
    fn flush(&self, values: &HashMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Store(format!("{}: {e}", parent.display())))?;
        }

        let json =
            serde_json::to_vec_pretty(values).map_err(|e| Error::Store(e.to_string()))?;
        let tmp = sibling(&self.path, "tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| Error::Store(format!("{}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Store(format!("{}: {e}", self.path.display())))
    }
}

/// `library.json` becomes `library.json.{suffix}`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.write().map_err(poisoned)?;
        values.insert(key.to_string(), value);
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().map_err(poisoned)?;
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }
}
