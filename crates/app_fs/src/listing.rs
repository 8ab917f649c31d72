//! Directory enumeration for the preload engine

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Check if a file is a supported image format
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            matches!(
                e.to_lowercase().as_str(),
                "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "ico" | "tiff" | "tif"
            )
        })
        .unwrap_or(false)
}

/// List image files directly inside a directory, lexicographically sorted.
///
/// A missing or unreadable directory yields an empty list; enumeration is
/// best-effort and never fails the caller.
pub fn list_image_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_supported_image(path))
        .collect();

    files.sort();
    files
}

/// List immediate subdirectories, lexicographically sorted
pub fn list_subdirectories(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();

    dirs.sort();
    dirs
}

/// Get the parent directory of a path
pub fn parent_directory(dir: &Path) -> Option<PathBuf> {
    dir.parent().map(|p| p.to_path_buf())
}

/// Files relevant to the viewing context of `dir`: images directly in the
/// directory, in its parent, and in each immediate subdirectory, in that
/// order with subdirectories visited name-sorted.
///
/// Overlapping enumerations (e.g. a root directory that is its own parent)
/// are deduplicated so each path appears exactly once.
pub fn relevant_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = list_image_files(dir);
    if let Some(parent) = parent_directory(dir) {
        files.extend(list_image_files(&parent));
    }
    for subdir in list_subdirectories(dir) {
        files.extend(list_image_files(&subdir));
    }

    let mut seen = HashSet::new();
    files.retain(|path| seen.insert(path.clone()));
    files
}
