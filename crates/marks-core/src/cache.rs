//! Memoized flattening keyed by bookmark file identity.
//!
//! [`FlattenCache`] wraps [`load_bookmarks`] with an on-disk memo. Entries
//! live under the cache directory as `<blake3(path)>.json` and are valid only
//! while the bookmark file's canonical path, modification time, and byte
//! length all match the recorded [`CacheKey`].
//!
//! The cache never changes what a load returns: cache read or write failures
//! are logged and the load falls back to flattening the file directly.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ErrorCode, FlattenError};
use crate::flatten::{Flattened, load_bookmarks};

/// Bumped whenever [`Flattened`]'s serialized shape changes.
const CACHE_FORMAT_VERSION: u32 = 1;

/// Errors from the cache's own storage. Never surfaced by [`FlattenCache::load`].
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cache entry encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Identity of a bookmark file at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKey {
    pub path: PathBuf,
    /// Modification time, microseconds since the Unix epoch.
    pub modified_us: i64,
    pub len: u64,
}

impl CacheKey {
    /// Fingerprint the file currently at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be canonicalized or stat'ed.
    pub fn for_file(path: &Path) -> io::Result<Self> {
        let path = fs::canonicalize(path)?;
        let meta = fs::metadata(&path)?;
        let modified_us = match meta.modified()?.duration_since(UNIX_EPOCH) {
            Ok(after) => i64::try_from(after.as_micros()).unwrap_or(i64::MAX),
            Err(before) => -i64::try_from(before.duration().as_micros()).unwrap_or(i64::MAX),
        };
        Ok(Self {
            path,
            modified_us,
            len: meta.len(),
        })
    }

    fn entry_name(&self) -> String {
        let digest = blake3::hash(self.path.to_string_lossy().as_bytes());
        format!("{}.json", digest.to_hex())
    }
}

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    version: u32,
    key: CacheKey,
    data: Flattened,
}

/// Where a [`FlattenCache::load`] result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Decoded from a fresh cache entry.
    Cache,
    /// Flattened from the file; the cache entry was written afterwards.
    FallbackStored,
    /// Flattened from the file; storing the cache entry failed (non-fatal).
    FallbackStoreFailed,
}

/// Result of a [`FlattenCache::load`] call, with provenance for diagnostics.
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub flattened: Flattened,
    pub source: LoadSource,
}

/// On-disk memo of flatten results.
#[derive(Debug, Clone)]
pub struct FlattenCache {
    dir: PathBuf,
}

impl FlattenCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache rooted at `$CACHE_DIR/marks`, if the platform has one.
    #[must_use]
    pub fn in_user_cache_dir() -> Option<Self> {
        dirs::cache_dir().map(|dir| Self::new(dir.join("marks")))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load and flatten `path`, reusing a fresh cache entry when present.
    ///
    /// # Errors
    ///
    /// Only errors from reading or flattening the bookmark file itself.
    /// Cache problems are logged and bypassed.
    pub fn load(&self, path: &Path) -> Result<LoadResult, FlattenError> {
        let key = match CacheKey::for_file(path) {
            Ok(key) => key,
            Err(err) => {
                debug!(error = %err, "cannot fingerprint bookmark file; bypassing cache");
                return load_bookmarks(path).map(|flattened| LoadResult {
                    flattened,
                    source: LoadSource::FallbackStoreFailed,
                });
            }
        };

        match self.read_entry(&key) {
            Ok(Some(flattened)) => {
                debug!(urls = flattened.urls.len(), "loaded bookmarks from cache");
                return Ok(LoadResult {
                    flattened,
                    source: LoadSource::Cache,
                });
            }
            Ok(None) => debug!("no fresh cache entry"),
            Err(err) => warn!(error = %err, "ignoring unreadable cache entry"),
        }

        let flattened = load_bookmarks(path)?;
        let source = match self.write_entry(&key, &flattened) {
            Ok(()) => LoadSource::FallbackStored,
            Err(err) => {
                warn!(
                    code = %ErrorCode::CacheWriteFailed,
                    error = %err,
                    dir = %self.dir.display(),
                    "failed to store cache entry"
                );
                LoadSource::FallbackStoreFailed
            }
        };

        Ok(LoadResult { flattened, source })
    }

    /// Remove the entry for `path`, if any.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the entry exists but cannot be removed.
    pub fn invalidate(&self, path: &Path) -> Result<(), CacheError> {
        let Ok(key) = CacheKey::for_file(path) else {
            return Ok(());
        };
        match fs::remove_file(self.dir.join(key.entry_name())) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }

    fn read_entry(&self, key: &CacheKey) -> Result<Option<Flattened>, CacheError> {
        let bytes = match fs::read(self.dir.join(key.entry_name())) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let entry: CacheEntry = serde_json::from_slice(&bytes)?;
        if entry.version != CACHE_FORMAT_VERSION || entry.key != *key {
            return Ok(None);
        }
        Ok(Some(entry.data))
    }

    fn write_entry(&self, key: &CacheKey, data: &Flattened) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let entry = CacheEntry {
            version: CACHE_FORMAT_VERSION,
            key: key.clone(),
            data: data.clone(),
        };
        let final_path = self.dir.join(key.entry_name());
        let tmp_path = final_path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_vec(&entry)?)?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }
}
