//! LightningGallery Core Engine
//!
//! This crate contains:
//! - Engine configuration
//! - Error types
//! - Image decode/resize/encode pipeline
//! - Bounded in-memory bitmap caches
//! - Thumbnail resolution (memory -> disk -> generate)
//! - Background prefetching with pause/redirect/stop

pub mod config;
pub mod error;
pub mod codec;
pub mod bitmap_cache;
pub mod resolver;
pub mod prefetch;
pub mod engine;

pub use config::{CacheConfig, EngineConfig, PrefetchConfig, WatchConfig};
pub use error::EngineError;
pub use codec::{Bitmap, Codec};
pub use bitmap_cache::BitmapCache;
pub use resolver::ThumbnailResolver;
pub use prefetch::Prefetcher;
pub use engine::{CacheStats, ThumbnailEngine};
