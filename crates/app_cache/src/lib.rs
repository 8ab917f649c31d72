//! LightningGallery Persistent Cache Layer
//!
//! Provides content-addressable identity for source images and the durable
//! on-disk thumbnail store:
//! - CacheKey: digest of (canonical path, target dimension, modification time)
//! - DiskStore: dimension-partitioned thumbnail files with atomic writes

mod key;
mod disk;

pub use key::{derive, CacheKey};
pub use disk::DiskStore;

use thiserror::Error;

/// Persistent cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Persist error: {0}")]
    Persist(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;
