//! Scan result caching.
//!
//! The registry can be backed by any [`CacheStore`]: a plain get/put/forget
//! surface with a TTL, no locking. Concurrent rebuilds at worst perform a
//! redundant scan. [`FileCache`] is the bundled store, writing one JSON file
//! per key under a cache directory.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// A minimal external cache store.
pub trait CacheStore {
    /// Fetch a live (non-expired) payload for `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `payload` under `key` for at most `ttl`.
    fn put(&self, key: &str, payload: &str, ttl: Duration) -> Result<()>;

    /// Drop the entry for `key`, if any.
    fn forget(&self, key: &str) -> Result<()>;
}

#[derive(Serialize, Deserialize)]
struct Entry {
    /// Expiry as seconds since the Unix epoch.
    expires_at: u64,
    payload: String,
}

/// File-backed cache store: one `<key>.json` per entry.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Store under the user cache directory (`<cache dir>/themely`), or the
    /// current directory when the platform reports none.
    pub fn default_location() -> Self {
        let dir = dirs::cache_dir()
            .map(|dir| dir.join("themely"))
            .unwrap_or_else(|| PathBuf::from(".themely-cache"));
        Self::new(dir)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        // Keys come from config; keep the file name safe regardless.
        let safe: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}

impl CacheStore for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        let contents = fs::read_to_string(&path).ok()?;

        let entry: Entry = match serde_json::from_str(&contents) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(cache = %path.display(), error = %err, "discarding unreadable cache entry");
                let _ = fs::remove_file(&path);
                return None;
            }
        };

        if entry.expires_at <= Self::now() {
            debug!(key, "cache entry expired");
            let _ = fs::remove_file(&path);
            return None;
        }

        Some(entry.payload)
    }

    fn put(&self, key: &str, payload: &str, ttl: Duration) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let entry = Entry {
            expires_at: Self::now().saturating_add(ttl.as_secs()),
            payload: payload.to_string(),
        };
        fs::write(self.entry_path(key), serde_json::to_string(&entry)?)?;
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
