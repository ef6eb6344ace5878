//! Client-side key/value persistence
//!
//! Stands in for browser local storage and cookies: a flat map of string keys
//! to JSON text. Entries written with [`set_expiring`] carry their expiry
//! instant and are removed by the first read at or after it.
//!
//! [`FileStore`] keeps the map in one JSON file, rewritten atomically on every
//! change.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const FAVORITES_KEY: &str = "favorites";
pub const WHEEL_DISCOUNT_KEY: &str = "wheel_discount";
pub const CART_KEY: &str = "cart";

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to replace store file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Lifetime of {0} is out of range")]
    LifetimeOutOfRange(Duration),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Backends that persist report write failures.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Backends that persist report write failures.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Volatile store, used by tests and one-shot sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON object on disk
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store; an
    /// unreadable or corrupt one is logged and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("Store file {} is corrupt, starting empty: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Cannot read store file {}: {e}", path.display());
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the whole map through a temporary file in the same directory,
    /// then renames it over the store file.
    fn flush(&self) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(&self.entries)?;
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        temp.write_all(json.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Reads a JSON value. Malformed payloads read as absent.
pub fn get_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring malformed '{key}' entry: {e}");
            None
        }
    }
}

/// # Errors
///
/// Returns [`StoreError`] if the value cannot be serialized or written.
pub fn set_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    store.set(key, serde_json::to_string(value)?)
}

/// A value stored with its expiry instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expiring<T> {
    pub value: T,
    pub expires_at: DateTime<Utc>,
}

impl<T> Expiring<T> {
    /// Expired from `expires_at` on, inclusive
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// # Errors
///
/// Returns [`StoreError`] if the entry cannot be serialized or written.
pub fn set_expiring<T, S>(
    store: &mut S,
    key: &str,
    value: T,
    expires_at: DateTime<Utc>,
) -> Result<(), StoreError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    set_json(store, key, &Expiring { value, expires_at })
}

/// Instant `lifetime` after `now`.
///
/// # Errors
///
/// Returns [`StoreError::LifetimeOutOfRange`] if the sum does not fit a
/// timestamp.
pub fn expiry_after(now: DateTime<Utc>, lifetime: Duration) -> Result<DateTime<Utc>, StoreError> {
    now.checked_add_signed(lifetime)
        .ok_or(StoreError::LifetimeOutOfRange(lifetime))
}

/// Reads an expiring entry, removing it when it has expired.
///
/// # Errors
///
/// Returns [`StoreError`] if removing an expired entry fails.
pub fn get_live<T, S>(
    store: &mut S,
    key: &str,
    now: DateTime<Utc>,
) -> Result<Option<Expiring<T>>, StoreError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match get_json::<Expiring<T>, S>(store, key) {
        Some(entry) if entry.is_expired(now) => {
            tracing::debug!("Entry '{key}' expired at {}", entry.expires_at);
            store.remove(key)?;
            Ok(None)
        }
        Some(entry) => Ok(Some(entry)),
        None => Ok(None),
    }
}

/// Favorite product ids, in the order they were added
pub fn favorites<S: KeyValueStore + ?Sized>(store: &S) -> Vec<u64> {
    get_json(store, FAVORITES_KEY).unwrap_or_default()
}

/// Adds or removes a favorite. Returns whether the product is now a favorite.
///
/// # Errors
///
/// Returns [`StoreError`] if the list cannot be written.
pub fn toggle_favorite<S: KeyValueStore + ?Sized>(
    store: &mut S,
    product_id: u64,
) -> Result<bool, StoreError> {
    let mut ids = favorites(store);
    let now_favorite = if let Some(pos) = ids.iter().position(|&id| id == product_id) {
        ids.remove(pos);
        false
    } else {
        ids.push(product_id);
        true
    };
    set_json(store, FAVORITES_KEY, &ids)?;
    Ok(now_favorite)
}
