//! LightningGallery - Thumbnail cache warmer
//!
//! Headless driver for the preload engine: warms the thumbnail caches for a
//! directory the way a gallery window would, then reports cache statistics.

mod app;

use anyhow::Result;

fn main() -> Result<()> {
    // Initialize logging and panic hook first
    app_log::init()?;

    // Clean up old logs (7 days)
    if let Err(e) = app_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("LightningGallery starting...");

    // Load configuration
    let config = app_core::EngineConfig::load().unwrap_or_default();

    app::run(config)
}
