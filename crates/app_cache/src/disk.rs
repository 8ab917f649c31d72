//! Durable on-disk thumbnail store
//!
//! Layout: `<cache-root>/thumbnails/<dimension>/<hex-digest>.png`, one file
//! per cached thumbnail, partitioned by target dimension so different sizes
//! never collide and can be purged independently. The store has no expiry
//! policy: it survives process restarts until external housekeeping removes
//! entries.

use crate::{CacheError, CacheKey, Result};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const THUMBNAIL_EXT: &str = "png";

/// Persistent key -> encoded-bitmap store
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Create a store rooted at `<cache_root>/thumbnails`
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            root: cache_root.into().join("thumbnails"),
        }
    }

    /// The store's root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dimension_dir(&self, dimension: u32) -> PathBuf {
        self.root.join(dimension.to_string())
    }

    /// Final path of the cached thumbnail for `key` at `dimension`
    pub fn thumbnail_path(&self, dimension: u32, key: &CacheKey) -> PathBuf {
        self.dimension_dir(dimension)
            .join(format!("{}.{}", key.to_hex(), THUMBNAIL_EXT))
    }

    /// Load the encoded bitmap for `key`, or `None` on any miss or read
    /// failure. Corrupt entries surface later as decode failures and are
    /// regenerated by the caller, never propagated as fatal.
    pub fn load(&self, dimension: u32, key: &CacheKey) -> Option<Vec<u8>> {
        let path = self.thumbnail_path(dimension, key);
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read cached thumbnail {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Persist an encoded bitmap under `key`.
    ///
    /// Writes to a uniquely named temporary sibling, then renames into place,
    /// so a concurrent `load` observes either nothing or the complete file.
    /// Two threads racing to fill the same key is benign: last rename wins.
    pub fn store(&self, dimension: u32, key: &CacheKey, encoded: &[u8]) -> Result<PathBuf> {
        let dir = self.dimension_dir(dimension);
        std::fs::create_dir_all(&dir)?;

        let final_path = self.thumbnail_path(dimension, key);
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(encoded)?;
        tmp.persist(&final_path)
            .map_err(|e| CacheError::Persist(format!("{}: {}", final_path.display(), e)))?;

        tracing::debug!("Stored thumbnail: {}", final_path.display());
        Ok(final_path)
    }

    /// Remove every cached entry for one dimension. Housekeeping hook for
    /// external cleanup; the store itself never evicts.
    pub fn purge_dimension(&self, dimension: u32) -> Result<usize> {
        let dir = self.dimension_dir(dimension);
        if !dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.path().is_file() && std::fs::remove_file(entry.path()).is_ok() {
                removed += 1;
            }
        }
        let _ = std::fs::remove_dir(&dir);

        tracing::info!("Purged {} thumbnails at dimension {}", removed, dimension);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_key() -> (TempDir, DiskStore, CacheKey) {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("img.png");
        std::fs::write(&source, b"pixels").unwrap();
        let key = crate::derive(&source, Some(192)).unwrap();
        let store = DiskStore::new(tmp.path().join("cache"));
        (tmp, store, key)
    }

    #[test]
    fn test_store_and_load_roundtrip() {
        let (_tmp, store, key) = store_with_key();
        let data = vec![1, 2, 3, 4, 5];

        let path = store.store(192, &key, &data).unwrap();
        assert!(path.ends_with(format!("192/{}.png", key.to_hex())));
        assert_eq!(store.load(192, &key).unwrap(), data);
    }

    #[test]
    fn test_load_missing_is_none() {
        let (_tmp, store, key) = store_with_key();
        assert!(store.load(192, &key).is_none());
    }

    #[test]
    fn test_dimensions_are_partitioned() {
        let (_tmp, store, key) = store_with_key();
        store.store(128, &key, b"small").unwrap();
        store.store(512, &key, b"large").unwrap();

        assert_eq!(store.load(128, &key).unwrap(), b"small");
        assert_eq!(store.load(512, &key).unwrap(), b"large");
        assert!(store.load(192, &key).is_none());
    }

    #[test]
    fn test_store_leaves_no_temp_files() {
        let (_tmp, store, key) = store_with_key();
        store.store(192, &key, b"data").unwrap();

        let entries: Vec<_> = std::fs::read_dir(store.root().join("192"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec![format!("{}.png", key.to_hex())]);
    }

    #[test]
    fn test_interrupted_store_is_invisible() {
        let (_tmp, store, key) = store_with_key();
        let dir = store.root().join("192");
        std::fs::create_dir_all(&dir).unwrap();

        // Simulate a crash between temp-write and rename: the temp file
        // exists but nothing sits at the final path.
        std::fs::write(dir.join(".tmp-interrupted"), b"half-written").unwrap();

        assert!(store.load(192, &key).is_none());
        assert!(!store.thumbnail_path(192, &key).exists());
    }

    #[test]
    fn test_purge_dimension() {
        let (_tmp, store, key) = store_with_key();
        store.store(192, &key, b"a").unwrap();
        store.store(256, &key, b"b").unwrap();

        assert_eq!(store.purge_dimension(192).unwrap(), 1);
        assert!(store.load(192, &key).is_none());
        assert_eq!(store.load(256, &key).unwrap(), b"b");

        // Purging an absent dimension is a no-op
        assert_eq!(store.purge_dimension(999).unwrap(), 0);
    }
}
