//! Engine error types

use thiserror::Error;

/// Main engine error type.
///
/// Nothing in this subsystem is fatal to the process: the resolver absorbs
/// every variant at its boundary and surfaces "no result yet" to callers.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Thumbnail persist error: {0}")]
    Persist(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<image::ImageError> for EngineError {
    fn from(e: image::ImageError) -> Self {
        EngineError::Decode(e.to_string())
    }
}

impl From<app_cache::CacheError> for EngineError {
    fn from(e: app_cache::CacheError) -> Self {
        EngineError::Persist(e.to_string())
    }
}
