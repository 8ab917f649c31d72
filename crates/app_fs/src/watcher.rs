//! File system watcher feeding the change debouncer

use crate::{ChangeDebouncer, Result};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Watches a single directory (non-recursive) and forwards every filesystem
/// event to a [`ChangeDebouncer`], which coalesces bursts into one settle
/// callback. Replace the watched directory with [`DirectoryWatcher::change_dir`]
/// when the user navigates.
pub struct DirectoryWatcher {
    watcher: RecommendedWatcher,
    watched: Option<PathBuf>,
}

impl DirectoryWatcher {
    /// Create a watcher that reports into the given debouncer
    pub fn new(debouncer: Arc<ChangeDebouncer>) -> Result<Self> {
        let watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(_) => debouncer.notify(),
                Err(e) => tracing::warn!("Watcher error: {:?}", e),
            },
        )?;

        Ok(Self {
            watcher,
            watched: None,
        })
    }

    /// Watch a directory for changes (non-recursive)
    pub fn watch(&mut self, dir: &Path) -> Result<()> {
        self.watcher.watch(dir, RecursiveMode::NonRecursive)?;
        self.watched = Some(dir.to_path_buf());
        tracing::info!("Watching: {}", dir.display());
        Ok(())
    }

    /// Stop watching the current directory
    pub fn unwatch(&mut self) -> Result<()> {
        if let Some(dir) = self.watched.take() {
            self.watcher.unwatch(&dir)?;
            tracing::info!("Unwatched: {}", dir.display());
        }
        Ok(())
    }

    /// Switch the watch to a different directory
    pub fn change_dir(&mut self, dir: &Path) -> Result<()> {
        self.unwatch()?;
        self.watch(dir)
    }
}

impl Drop for DirectoryWatcher {
    fn drop(&mut self) {
        if let Some(dir) = self.watched.take() {
            let _ = self.watcher.unwatch(&dir);
        }
    }
}
