//! Thumbnail resolution: memory -> disk -> decode-and-resize-and-persist

use crate::bitmap_cache::BitmapCache;
use crate::codec::{self, Bitmap, Codec};
use app_cache::DiskStore;
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;

/// Orchestrates cache lookup and fill for render-ready thumbnails.
///
/// Every failure mode (missing source, corrupt data, failed persist) is
/// absorbed here and surfaced as `None`; callers treat that as "no thumbnail
/// available now", not as permanent. A later call may succeed.
pub struct ThumbnailResolver {
    disk: Arc<DiskStore>,
    full_cache: Arc<BitmapCache<DynamicImage>>,
    thumb_cache: Arc<BitmapCache<Bitmap>>,
    codec: Codec,
}

impl ThumbnailResolver {
    pub fn new(
        disk: Arc<DiskStore>,
        full_cache: Arc<BitmapCache<DynamicImage>>,
        thumb_cache: Arc<BitmapCache<Bitmap>>,
    ) -> Self {
        Self {
            disk,
            full_cache,
            thumb_cache,
            codec: Codec::new(),
        }
    }

    /// Resolve a render-ready thumbnail for `path` fitting `dimension`.
    ///
    /// Lookup order, short-circuiting on first success: memory thumbnail
    /// cache, disk store, then decode the source (through the full-resolution
    /// cache), resize, persist, and cache.
    pub fn resolve(&self, path: &Path, dimension: u32) -> Option<Arc<Bitmap>> {
        let key = match app_cache::derive(path, Some(dimension)) {
            Some(key) => key,
            None => {
                tracing::debug!("No cache key for {}", path.display());
                return None;
            }
        };

        if let Some(hit) = self.thumb_cache.get(&key) {
            return Some(hit);
        }

        if let Some(bytes) = self.disk.load(dimension, &key) {
            match self.codec.decode_bytes(&bytes) {
                Ok(img) => {
                    let bitmap = Arc::new(Bitmap::from_image(&img));
                    self.thumb_cache.put(key, bitmap.clone());
                    return Some(bitmap);
                }
                Err(e) => {
                    // Corrupt cache entry: regenerate below
                    tracing::warn!(
                        "Cached thumbnail for {} unreadable ({}), regenerating",
                        path.display(),
                        e
                    );
                }
            }
        }

        let full = self.full_size(path)?;
        let thumb_img = codec::resize_to_fit(&full, dimension);

        match codec::encode_png(&thumb_img) {
            Ok(encoded) => {
                if let Err(e) = self.disk.store(dimension, &key, &encoded) {
                    // The in-memory result is still good; deny nothing
                    tracing::warn!("Failed to persist thumbnail for {}: {}", path.display(), e);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to encode thumbnail for {}: {}", path.display(), e);
            }
        }

        let bitmap = Arc::new(Bitmap::from_image(&thumb_img));
        self.thumb_cache.put(key, bitmap.clone());
        Some(bitmap)
    }

    /// Fetch the decoded full-resolution source through its cache
    pub fn full_size(&self, path: &Path) -> Option<Arc<DynamicImage>> {
        let key = app_cache::derive(path, None)?;

        if let Some(hit) = self.full_cache.get(&key) {
            return Some(hit);
        }

        match self.codec.decode(path) {
            Ok(img) => {
                let img = Arc::new(img);
                self.full_cache.put(key, img.clone());
                Some(img)
            }
            Err(e) => {
                tracing::warn!("Cannot load {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Total codec invocations, for cache-hit verification and stats
    pub fn decode_count(&self) -> u64 {
        self.codec.decode_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::fs::OpenOptions;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn make_resolver(root: &Path) -> ThumbnailResolver {
        ThumbnailResolver::new(
            Arc::new(DiskStore::new(root.to_path_buf())),
            Arc::new(BitmapCache::new(16)),
            Arc::new(BitmapCache::new(16)),
        )
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbaImage::from_pixel(width, height, Rgba([40, 80, 120, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_second_resolve_skips_codec() {
        let tmp = TempDir::new().unwrap();
        let img = tmp.path().join("img.png");
        write_png(&img, 64, 48);
        let resolver = make_resolver(&tmp.path().join("cache"));

        let first = resolver.resolve(&img, 16).unwrap();
        assert_eq!((first.width, first.height), (16, 12));
        let decodes_after_first = resolver.decode_count();

        let second = resolver.resolve(&img, 16).unwrap();
        assert_eq!((second.width, second.height), (16, 12));
        assert_eq!(resolver.decode_count(), decodes_after_first);
    }

    #[test]
    fn test_disk_hit_survives_memory_loss() {
        let tmp = TempDir::new().unwrap();
        let img = tmp.path().join("img.png");
        write_png(&img, 64, 48);
        let cache_root = tmp.path().join("cache");

        make_resolver(&cache_root).resolve(&img, 16).unwrap();

        // Fresh resolver, empty memory caches, shared disk store
        let resolver = make_resolver(&cache_root);
        let thumb = resolver.resolve(&img, 16).unwrap();
        assert_eq!((thumb.width, thumb.height), (16, 12));
        // Served from disk: one decode of the cached bytes, no source decode
        assert_eq!(resolver.decode_count(), 1);
    }

    #[test]
    fn test_mtime_change_invalidates_without_overwrite() {
        let tmp = TempDir::new().unwrap();
        let img = tmp.path().join("img.png");
        write_png(&img, 64, 48);
        let cache_root = tmp.path().join("cache");
        let resolver = make_resolver(&cache_root);
        let disk = DiskStore::new(cache_root.clone());

        let old_key = app_cache::derive(&img, Some(16)).unwrap();
        resolver.resolve(&img, 16).unwrap();
        assert!(disk.load(16, &old_key).is_some());

        let bumped = SystemTime::now() + Duration::from_secs(5);
        OpenOptions::new()
            .write(true)
            .open(&img)
            .unwrap()
            .set_modified(bumped)
            .unwrap();

        let new_key = app_cache::derive(&img, Some(16)).unwrap();
        assert_ne!(old_key, new_key);

        resolver.resolve(&img, 16).unwrap();
        // New entry created; the old one is orphaned but still retrievable
        assert!(disk.load(16, &new_key).is_some());
        assert!(disk.load(16, &old_key).is_some());
    }

    #[test]
    fn test_missing_source_is_none() {
        let tmp = TempDir::new().unwrap();
        let resolver = make_resolver(&tmp.path().join("cache"));
        assert!(resolver.resolve(&tmp.path().join("gone.png"), 16).is_none());
    }

    #[test]
    fn test_corrupt_source_is_none_then_recoverable() {
        let tmp = TempDir::new().unwrap();
        let img = tmp.path().join("img.png");
        std::fs::write(&img, b"garbage").unwrap();
        let resolver = make_resolver(&tmp.path().join("cache"));

        assert!(resolver.resolve(&img, 16).is_none());

        // The same path succeeds once the underlying condition resolves
        write_png(&img, 32, 32);
        assert!(resolver.resolve(&img, 16).is_some());
    }

    #[test]
    fn test_corrupt_disk_entry_regenerates() {
        let tmp = TempDir::new().unwrap();
        let img = tmp.path().join("img.png");
        write_png(&img, 64, 48);
        let cache_root = tmp.path().join("cache");
        let disk = DiskStore::new(cache_root.clone());

        make_resolver(&cache_root).resolve(&img, 16).unwrap();

        // Clobber the cached bytes behind the store's back
        let key = app_cache::derive(&img, Some(16)).unwrap();
        std::fs::write(disk.thumbnail_path(16, &key), b"corrupt").unwrap();

        // A fresh resolver falls through to regeneration
        let resolver = make_resolver(&cache_root);
        let thumb = resolver.resolve(&img, 16).unwrap();
        assert_eq!((thumb.width, thumb.height), (16, 12));
    }

    #[test]
    fn test_persist_failure_still_returns_bitmap() {
        let tmp = TempDir::new().unwrap();
        let img = tmp.path().join("img.png");
        write_png(&img, 64, 48);

        // A regular file squats on the dimension directory path, so the
        // store cannot create it and every persist fails.
        let cache_root = tmp.path().join("cache");
        std::fs::create_dir_all(cache_root.join("thumbnails")).unwrap();
        std::fs::write(cache_root.join("thumbnails/16"), b"in the way").unwrap();

        let resolver = make_resolver(&cache_root);
        let thumb = resolver.resolve(&img, 16).unwrap();
        assert_eq!((thumb.width, thumb.height), (16, 12));
    }

    #[test]
    fn test_full_size_cached_across_dimensions() {
        let tmp = TempDir::new().unwrap();
        let img = tmp.path().join("img.png");
        write_png(&img, 64, 48);
        let resolver = make_resolver(&tmp.path().join("cache"));

        resolver.resolve(&img, 16).unwrap();
        let decodes = resolver.decode_count();

        // A second dimension reuses the decoded source from the full cache
        let thumb = resolver.resolve(&img, 32).unwrap();
        assert_eq!((thumb.width, thumb.height), (32, 24));
        assert_eq!(resolver.decode_count(), decodes);
    }
}
