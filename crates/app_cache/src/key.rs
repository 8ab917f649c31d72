//! Content-identity keys for cached bitmaps

use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Dimension sentinel for the path-only (full resolution) identity
const FULL_SIZE_DIMENSION: i64 = -1;

/// Modification-time sentinel used when the timestamp cannot be read.
/// Trades perfect invalidation for availability.
const MTIME_SENTINEL: u128 = 0;

/// Identity of a cached bitmap: a SHA-256 digest over the canonical source
/// path, the target dimension, and the source modification time. Any change
/// to the underlying file yields a new key; stale entries are orphaned, never
/// returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex form, used as the on-disk file stem
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(64);
        for byte in self.0 {
            let _ = write!(hex, "{:02x}", byte);
        }
        hex
    }
}

/// Derive the cache key for `(path, dimension)`, or the path-only identity
/// when `dimension` is `None`.
///
/// Symbolic links are resolved first so every link name shares one cache
/// entry. Returns `None` when the source file does not exist; callers treat
/// that as "nothing to cache yet". Any other failure to read the modification
/// time falls back to a fixed sentinel instead of failing.
pub fn derive(path: &Path, dimension: Option<u32>) -> Option<CacheKey> {
    let canonical = match std::fs::canonicalize(path) {
        Ok(p) => p,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("Source not found for cache key: {}", path.display());
            return None;
        }
        Err(e) => {
            tracing::warn!("Cannot canonicalize {}: {}", path.display(), e);
            path.to_path_buf()
        }
    };

    let mtime_nanos = match std::fs::metadata(&canonical) {
        Ok(meta) => match meta.modified() {
            Ok(mtime) => mtime
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(MTIME_SENTINEL),
            Err(e) => {
                tracing::warn!(
                    "Cannot read modification time for {}: {}. Using sentinel.",
                    canonical.display(),
                    e
                );
                MTIME_SENTINEL
            }
        },
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("Source not found for cache key: {}", canonical.display());
            return None;
        }
        Err(e) => {
            tracing::warn!(
                "Cannot stat {}: {}. Using sentinel timestamp.",
                canonical.display(),
                e
            );
            MTIME_SENTINEL
        }
    };

    let dim = dimension.map(i64::from).unwrap_or(FULL_SIZE_DIMENSION);

    // Structured encoding: NUL-separated path bytes followed by fixed-width
    // integers, so distinct inputs can never concatenate ambiguously.
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_os_str().as_encoded_bytes());
    hasher.update([0u8]);
    hasher.update(dim.to_le_bytes());
    hasher.update(mtime_nanos.to_le_bytes());

    Some(CacheKey(hasher.finalize().into()))
}
