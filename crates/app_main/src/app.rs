//! Warm-up run loop
//!
//! Plays the role of the UI thread: owns the per-view prefetcher and
//! watcher, drains the completion queue on a periodic tick, and re-runs the
//! prefetcher when the watched directory settles after a change burst.

use anyhow::{bail, Context as _};
use app_core::{EngineConfig, ThumbnailEngine};
use app_fs::{ChangeDebouncer, DirectoryWatcher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Consecutive quiet ticks before the warmer considers the pass settled
const QUIET_TICKS_TO_EXIT: u32 = 40;

pub fn run(config: EngineConfig) -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let first = match args.next() {
        Some(arg) => arg,
        None => {
            bail!("usage: lightning_gallery <directory> [dimension] | --purge <dimension>");
        }
    };

    if first == "--purge" {
        let raw = args.next().context("--purge requires a dimension")?;
        let dimension = raw
            .parse::<u32>()
            .with_context(|| format!("invalid dimension: {raw}"))?;
        let engine = ThumbnailEngine::new(config)?;
        let removed = engine.disk_store().purge_dimension(dimension)?;
        tracing::info!("Purged {} cached thumbnails at {}px", removed, dimension);
        return Ok(());
    }

    let directory = PathBuf::from(first);
    let dimension = match args.next() {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("invalid dimension: {raw}"))?,
        None => config.cache.thumbnail_dim,
    };

    if !directory.is_dir() {
        bail!("not a directory: {}", directory.display());
    }

    let drain_interval = Duration::from_millis(config.watch.drain_interval_ms);
    let settle_quiet = Duration::from_millis(config.watch.settle_quiet_ms);

    let engine = ThumbnailEngine::new(config)?;
    let prefetcher = engine.spawn_prefetcher(&directory, dimension);
    prefetcher.run(&directory, dimension);

    // Directory change notifications coalesce into settle signals drained
    // by the tick loop below, mirroring a UI-thread timer.
    let (settle_tx, settle_rx) = crossbeam_channel::unbounded::<()>();
    let debouncer = Arc::new(ChangeDebouncer::new(settle_quiet, move || {
        let _ = settle_tx.send(());
    }));
    let mut watcher = DirectoryWatcher::new(debouncer)?;
    if let Err(e) = watcher.watch(&directory) {
        tracing::warn!("Directory watch unavailable: {}", e);
    }

    tracing::info!(
        "Warming thumbnails for {} at {}px",
        directory.display(),
        dimension
    );

    // Idle re-scans re-announce already-warm paths; only fresh ones reset
    // the quiet countdown, so the warmer terminates once a pass adds nothing.
    let mut warmed = std::collections::HashSet::new();
    let mut quiet_ticks = 0u32;
    loop {
        std::thread::sleep(drain_interval);

        let mut fresh = 0usize;
        for path in prefetcher.drain_completed() {
            if warmed.insert(path.clone()) {
                fresh += 1;
                tracing::info!("Cached: {}", path.display());
            }
        }
        if fresh == 0 {
            quiet_ticks += 1;
        } else {
            quiet_ticks = 0;
        }

        if settle_rx.try_iter().count() > 0 {
            tracing::info!("Directory contents changed, re-scanning");
            prefetcher.run(&directory, dimension);
            quiet_ticks = 0;
        }

        if quiet_ticks >= QUIET_TICKS_TO_EXIT {
            break;
        }
    }

    let stats = engine.stats();
    tracing::info!(
        "Warmed {} thumbnails ({} decodes, {} full images and {} thumbnails in memory)",
        warmed.len(),
        stats.decode_calls,
        stats.full_image_entries,
        stats.thumbnail_entries
    );

    Ok(())
}
