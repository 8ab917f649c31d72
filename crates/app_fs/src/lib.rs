//! LightningGallery File System Layer
//!
//! Provides the filesystem-facing half of the preload engine:
//! - Image file detection and sorted directory enumeration
//! - Relevant-file discovery for the prefetcher (current + parent + subdirectories)
//! - Directory change debouncing
//! - File watching

mod listing;
mod debounce;
mod watcher;

pub use listing::{
    is_supported_image, list_image_files, list_subdirectories, parent_directory, relevant_files,
};
pub use debounce::ChangeDebouncer;
pub use watcher::DirectoryWatcher;

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

pub type Result<T> = std::result::Result<T, FsError>;
