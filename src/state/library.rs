use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::LibraryError;

/// Extensions shown by the viewer (matched on the lower-cased file name)
const IMAGE_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// Scan `directory` (not recursively) for images.
///
/// Files are returned sorted by name so a start index always points at the
/// same picture. Unreadable entries are skipped with a warning; an
/// inaccessible directory or an empty result is an error.
pub fn scan_directory(directory: &Path) -> Result<Vec<PathBuf>, LibraryError> {
    let metadata = std::fs::metadata(directory).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LibraryError::NotFound(directory.to_path_buf()),
        io::ErrorKind::PermissionDenied => LibraryError::PermissionDenied(directory.to_path_buf()),
        _ => LibraryError::Io {
            path: directory.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() {
        return Err(LibraryError::NotADirectory(directory.to_path_buf()));
    }

    tracing::info!("Scanning folder: {}", directory.display());

    let mut images = Vec::new();

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                // The directory itself could not be listed
                let path = directory.to_path_buf();
                return Err(match err.into_io_error() {
                    Some(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                        LibraryError::PermissionDenied(path)
                    }
                    Some(source) => LibraryError::Io { path, source },
                    None => LibraryError::NotADirectory(path),
                });
            }
            Err(err) => {
                tracing::warn!("Skipping entry: {}", err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if is_image_name(&entry.file_name().to_string_lossy()) {
            images.push(entry.into_path());
        }
    }

    if images.is_empty() {
        return Err(LibraryError::NoImages(directory.to_path_buf()));
    }

    tracing::info!("Found {} images in {}", images.len(), directory.display());
    Ok(images)
}

fn is_image_name(name: &str) -> bool {
    let name = name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Position in the image list. Moves clamp at both ends instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    len: usize,
    index: usize,
}

impl Cursor {
    /// Start at `start`, clamped to the last image. `len` must be non-zero.
    pub fn new(len: usize, start: usize) -> Self {
        debug_assert!(len > 0, "cursor over an empty list");
        Self {
            len,
            index: start.min(len.saturating_sub(1)),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Step forward; stays on the last image. Returns whether it moved.
    pub fn forward(&mut self) -> bool {
        if self.index + 1 < self.len {
            self.index += 1;
            return true;
        }
        false
    }

    /// Step back; stays on the first image. Returns whether it moved.
    pub fn back(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            return true;
        }
        false
    }
}
