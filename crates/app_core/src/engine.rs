//! Process-wide engine context
//!
//! Owns the disk store and the two memory caches shared by every open
//! directory view, constructed once and injected where needed. Per-view
//! prefetchers are spawned from here but owned by their views.

use crate::bitmap_cache::BitmapCache;
use crate::codec::Bitmap;
use crate::config::EngineConfig;
use crate::prefetch::Prefetcher;
use crate::resolver::ThumbnailResolver;
use crate::EngineError;
use app_cache::DiskStore;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub full_image_entries: usize,
    pub thumbnail_entries: usize,
    pub decode_calls: u64,
}

/// The engine's shared state: configuration, disk store, memory caches,
/// and the resolver that ties them together.
pub struct ThumbnailEngine {
    config: EngineConfig,
    disk: Arc<DiskStore>,
    full_cache: Arc<BitmapCache<DynamicImage>>,
    thumb_cache: Arc<BitmapCache<Bitmap>>,
    resolver: Arc<ThumbnailResolver>,
}

impl ThumbnailEngine {
    /// Construct the engine, creating the cache root on demand
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let cache_root = config.cache_root();
        std::fs::create_dir_all(&cache_root)?;
        tracing::info!("Thumbnail cache root: {}", cache_root.display());

        let disk = Arc::new(DiskStore::new(cache_root));
        let full_cache = Arc::new(BitmapCache::new(config.cache.full_image_capacity));
        let thumb_cache = Arc::new(BitmapCache::new(config.cache.thumbnail_capacity));
        let resolver = Arc::new(ThumbnailResolver::new(
            disk.clone(),
            full_cache.clone(),
            thumb_cache.clone(),
        ));

        Ok(Self {
            config,
            disk,
            full_cache,
            thumb_cache,
            resolver,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The shared resolver, for on-demand resolution from the UI thread
    pub fn resolver(&self) -> Arc<ThumbnailResolver> {
        self.resolver.clone()
    }

    /// The durable disk store, for housekeeping hooks
    pub fn disk_store(&self) -> Arc<DiskStore> {
        self.disk.clone()
    }

    /// Spawn a prefetcher for one directory view. The caller owns it and
    /// must `run` it to start warming; dropping it stops and joins the
    /// worker.
    pub fn spawn_prefetcher(&self, directory: impl Into<PathBuf>, dimension: u32) -> Prefetcher {
        Prefetcher::spawn(
            self.resolver.clone(),
            directory,
            dimension,
            Duration::from_millis(self.config.prefetch.idle_poll_ms),
        )
    }

    /// On-demand resolution for the UI thread; may race benignly with a
    /// prefetcher warming the same key.
    pub fn resolve(&self, path: &Path, dimension: u32) -> Option<Arc<Bitmap>> {
        self.resolver.resolve(path, dimension)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            full_image_entries: self.full_cache.len(),
            thumbnail_entries: self.thumb_cache.len(),
            decode_calls: self.resolver.decode_count(),
        }
    }
}
