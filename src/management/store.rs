use std::{
    collections::BTreeMap,
    fmt, io,
    path::PathBuf,
    sync::Mutex,
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

pub const KEY_AUTH: &str = "auth";
pub const KEY_PREFERENCES: &str = "preferences";
pub const KEY_REDIRECT: &str = "redirect_after_login";

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct StoreChange {
    pub key: String,
    pub value: Option<Value>,
}

#[derive(Debug)]
pub enum StoreError {
    IoError(io::Error),
    SerdeError(serde_json::Error),
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::IoError(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerdeError(err)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::IoError(e) => write!(f, "store I/O error: {e}", e = e),
            StoreError::SerdeError(e) => write!(f, "store serialization error: {e}", e = e),
        }
    }
}

impl std::error::Error for StoreError {}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Value>>,
    events: broadcast::Sender<StoreChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Mutex::new(BTreeMap::new()),
            events,
        }
    }

    fn notify(&self, key: &str, value: Option<Value>) {
        // nobody listening is fine
        let _ = self.events.send(StoreChange {
            key: key.to_string(),
            value,
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let entries = self.entries.lock().expect("store mutex poisoned");
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        {
            let mut entries = self.entries.lock().expect("store mutex poisoned");
            entries.insert(key.to_string(), value.clone());
        }
        self.notify(key, Some(value));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let removed = {
            let mut entries = self.entries.lock().expect("store mutex poisoned");
            entries.remove(key).is_some()
        };
        // notifications only fire for keys that actually existed
        if removed {
            self.notify(key, None);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let keys: Vec<String> = {
            let mut entries = self.entries.lock().expect("store mutex poisoned");
            let keys = entries.keys().cloned().collect();
            entries.clear();
            keys
        };
        for key in keys {
            self.notify(&key, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.events.subscribe()
    }
}

/// Durable store backed by a single JSON file holding a key/value map.
pub struct FileStore {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
    events: broadcast::Sender<StoreChange>,
}

impl FileStore {
    pub fn new(name: &str) -> Self {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(format!("vinylcli/store/{name}.json", name = name));
        Self::at_path(path)
    }

    pub fn at_path(path: PathBuf) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            path,
            lock: tokio::sync::Mutex::new(()),
            events,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn notify(&self, key: &str, value: Option<Value>) {
        let _ = self.events.send(StoreChange {
            key: key.to_string(),
            value,
        });
    }

    async fn read_map(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        match async_fs::read_to_string(&self.path).await {
            Ok(json) => serde_json::from_str(&json).map_err(|e| StoreError::SerdeError(e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StoreError::IoError(e)),
        }
    }

    async fn write_map(&self, map: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::IoError(e))?;
        }

        let json = serde_json::to_string_pretty(map).map_err(|e| StoreError::SerdeError(e))?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| StoreError::IoError(e))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let _guard = self.lock.lock().await;
        let map = self.read_map().await?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value.clone());
        self.write_map(&map).await?;
        self.notify(key, Some(value));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map).await?;
        self.notify(key, None);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let map = self.read_map().await?;
        match async_fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::IoError(e)),
        }
        for key in map.keys() {
            self.notify(key, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.events.subscribe()
    }
}
