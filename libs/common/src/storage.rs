//! Dual-scope key-value storage for the Upkeep client
//!
//! The client persists a small fixed set of session and tenant fields across
//! two scopes: a durable scope that survives process restarts (backed by a
//! JSON snapshot on disk) and an ephemeral scope that lives only for the
//! current process. Both scopes address the same key names and are never
//! merged; the caller picks which scope owns a value.
//!
//! Storage problems never surface to callers. A failed read degrades to
//! "value absent", a failed write to a no-op, so the rest of the client keeps
//! working even when the backing store is unavailable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};

/// Persistence scope for a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Survives process restarts
    Durable,
    /// Cleared when the process ends
    Ephemeral,
}

/// The fixed set of keys the client persists
///
/// Both scopes use these same key names. No other keys are part of the
/// storage contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    AccessToken,
    TokenType,
    UserId,
    UserName,
    OrganizationCode,
    OrganizationName,
    AdminToken,
    FcmToken,
}

impl StorageKey {
    /// Every key the client owns, in one place so logout can clear them all
    pub const ALL: [StorageKey; 8] = [
        StorageKey::AccessToken,
        StorageKey::TokenType,
        StorageKey::UserId,
        StorageKey::UserName,
        StorageKey::OrganizationCode,
        StorageKey::OrganizationName,
        StorageKey::AdminToken,
        StorageKey::FcmToken,
    ];

    /// The key name used in both scopes
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::AccessToken => "accessToken",
            StorageKey::TokenType => "tokenType",
            StorageKey::UserId => "userId",
            StorageKey::UserName => "userName",
            StorageKey::OrganizationCode => "organizationCode",
            StorageKey::OrganizationName => "organizationName",
            StorageKey::AdminToken => "adminToken",
            StorageKey::FcmToken => "fcmToken",
        }
    }
}

/// Backend contract for a single storage scope
pub trait StorageBackend: Send + Sync {
    /// Get a value by key
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store a value under a key, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-memory backend for the ephemeral scope
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// On-disk snapshot format of the durable scope
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    entries: HashMap<String, String>,
    updated_at: chrono::DateTime<Utc>,
}

/// File-backed backend for the durable scope
///
/// Keeps a cached copy of the snapshot in memory and persists after each
/// mutation. When a persist fails the cached copy is kept, so the process
/// continues with in-memory state only for its remaining lifetime.
pub struct FileBackend {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileBackend {
    /// Open a file-backed scope, loading any existing snapshot
    ///
    /// A missing file starts empty; an unreadable or corrupt snapshot is
    /// logged and also starts empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match Self::load(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to load storage snapshot from {:?}: {}", path, e);
                HashMap::new()
            }
        };

        FileBackend {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn load(path: &Path) -> StorageResult<HashMap<String, String>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let raw = std::fs::read_to_string(path).map_err(StorageError::Io)?;
        let snapshot: Snapshot =
            serde_json::from_str(&raw).map_err(StorageError::Serialization)?;
        Ok(snapshot.entries)
    }

    fn persist(&self, entries: &HashMap<String, String>) -> StorageResult<()> {
        let snapshot = Snapshot {
            entries: entries.clone(),
            updated_at: Utc::now(),
        };

        let raw = serde_json::to_string_pretty(&snapshot).map_err(StorageError::Serialization)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }
        std::fs::write(&self.path, raw).map_err(StorageError::Io)?;

        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&entries)
    }
}

/// Uniform facade over the durable and ephemeral scopes
///
/// All operations are infallible from the caller's perspective: backend
/// errors are logged and swallowed, reads degrade to `None` and writes to
/// no-ops.
pub struct StorageAccessor {
    durable: Box<dyn StorageBackend>,
    ephemeral: Box<dyn StorageBackend>,
}

impl StorageAccessor {
    /// Create an accessor from explicit backends
    pub fn new(durable: Box<dyn StorageBackend>, ephemeral: Box<dyn StorageBackend>) -> Self {
        StorageAccessor { durable, ephemeral }
    }

    /// Create an accessor with a file-backed durable scope at `path`
    pub fn open(path: impl AsRef<Path>) -> Self {
        StorageAccessor::new(
            Box::new(FileBackend::open(path)),
            Box::new(MemoryBackend::new()),
        )
    }

    /// Create an accessor with both scopes held in memory
    ///
    /// Useful for tests and headless embedding; the "durable" scope then
    /// lives only as long as the process.
    pub fn in_memory() -> Self {
        StorageAccessor::new(Box::new(MemoryBackend::new()), Box::new(MemoryBackend::new()))
    }

    fn backend(&self, scope: Scope) -> &dyn StorageBackend {
        match scope {
            Scope::Durable => self.durable.as_ref(),
            Scope::Ephemeral => self.ephemeral.as_ref(),
        }
    }

    /// Store a value under a key in the chosen scope
    pub fn write(&self, scope: Scope, key: StorageKey, value: &str) {
        if let Err(e) = self.backend(scope).set(key.as_str(), value) {
            warn!("Failed to write {} to {:?} storage: {}", key.as_str(), scope, e);
        }
    }

    /// Read a value from one scope
    pub fn read(&self, scope: Scope, key: StorageKey) -> Option<String> {
        match self.backend(scope).get(key.as_str()) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {} from {:?} storage: {}", key.as_str(), scope, e);
                None
            }
        }
    }

    /// Read a value from whichever scope holds it, durable scope first
    pub fn read_any(&self, key: StorageKey) -> Option<String> {
        self.read(Scope::Durable, key)
            .or_else(|| self.read(Scope::Ephemeral, key))
    }

    /// Remove a key from one scope
    pub fn remove(&self, scope: Scope, key: StorageKey) {
        if let Err(e) = self.backend(scope).remove(key.as_str()) {
            warn!(
                "Failed to remove {} from {:?} storage: {}",
                key.as_str(),
                scope,
                e
            );
        }
    }

    /// Remove the given keys from BOTH scopes
    ///
    /// Used at logout so no residual state survives even if the original
    /// write scope is misremembered.
    pub fn clear(&self, keys: &[StorageKey]) {
        debug!("Clearing {} keys from both storage scopes", keys.len());
        for key in keys {
            self.remove(Scope::Durable, *key);
            self.remove(Scope::Ephemeral, *key);
        }
    }
}
