/// Browsing session: which image is shown, its tags, and what may happen next
///
/// The session never talks to ExifTool itself. It hands out `WriteRequest`s
/// and receives load/write results, so it can be driven synchronously in
/// tests and asynchronously from the UI.

use std::path::{Path, PathBuf};

use super::library::Cursor;
use super::tags::{Palette, TagSet};

/// Tags of the current image
#[derive(Debug, Clone, PartialEq)]
pub enum TagState {
    /// A read is in flight
    Loading,
    /// Tags as last read or written
    Ready(TagSet),
    /// The read failed; writing would clobber tags we never saw
    Unavailable(String),
}

/// A tag read to run. Only the result carrying the latest `id` is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTicket {
    pub path: PathBuf,
    pub id: u64,
}

/// A keyword write to run against the store
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    pub path: PathBuf,
    pub tags: Vec<String>,
    pub removals: Vec<String>,
}

/// What the caller should do after a write finished
#[derive(Debug, Clone, PartialEq)]
pub enum AfterWrite {
    Done,
    /// The write failed on the current image; re-read it from disk
    Reload(LoadTicket),
}

#[derive(Debug)]
pub struct Session {
    files: Vec<PathBuf>,
    cursor: Cursor,
    tags: TagState,
    palette: Palette,
    writing: bool,
    /// Id of the most recent read; older results are stale
    load_id: u64,
}

impl Session {
    /// New session over a non-empty image list, starting at `start` (clamped).
    /// Returns `None` for an empty list.
    pub fn new(files: Vec<PathBuf>, start: usize) -> Option<Self> {
        if files.is_empty() {
            return None;
        }
        let cursor = Cursor::new(files.len(), start);
        Some(Self {
            files,
            cursor,
            tags: TagState::Loading,
            palette: Palette::default(),
            writing: false,
            load_id: 0,
        })
    }

    pub fn current_path(&self) -> &Path {
        &self.files[self.cursor.index()]
    }

    pub fn index(&self) -> usize {
        self.cursor.index()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn tags(&self) -> &TagState {
        &self.tags
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Navigation waits for a pending write so it lands on settled state
    pub fn can_navigate(&self) -> bool {
        !self.writing
    }

    /// Toggling needs the current tags and no other write in flight
    pub fn can_toggle(&self) -> bool {
        !self.writing && matches!(self.tags, TagState::Ready(_))
    }

    /// Move forward. Returns the read to start, or `None` when already on
    /// the last image or while a write is pending.
    pub fn forward(&mut self) -> Option<LoadTicket> {
        if !self.can_navigate() || !self.cursor.forward() {
            return None;
        }
        Some(self.begin_load())
    }

    /// Move back. Same contract as `forward`.
    pub fn back(&mut self) -> Option<LoadTicket> {
        if !self.can_navigate() || !self.cursor.back() {
            return None;
        }
        Some(self.begin_load())
    }

    /// Mark the current image as loading and hand out a fresh ticket
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_id += 1;
        self.tags = TagState::Loading;
        LoadTicket {
            path: self.current_path().to_path_buf(),
            id: self.load_id,
        }
    }

    /// Apply a read result. Anything but the latest read is dropped, and so
    /// is every result that arrives while a write is in flight.
    pub fn tags_loaded(&mut self, id: u64, result: Result<Vec<String>, String>) -> bool {
        if id != self.load_id || self.writing {
            tracing::debug!("Ignoring stale tag read #{} (latest #{})", id, self.load_id);
            return false;
        }

        self.tags = match result {
            Ok(tags) => {
                let set = TagSet::new(tags);
                self.palette.extend_from(&set);
                TagState::Ready(set)
            }
            Err(err) => TagState::Unavailable(err),
        };
        true
    }

    /// Add a palette button from the entry field
    pub fn add_to_palette(&mut self, tag: &str) -> bool {
        self.palette.insert(tag).is_some()
    }

    /// Toggle `tag` on the current image and produce the write to run.
    ///
    /// Returns `None` when toggling is not allowed right now.
    pub fn toggle(&mut self, tag: &str) -> Option<WriteRequest> {
        if self.writing {
            return None;
        }
        let path = self.current_path().to_path_buf();
        let TagState::Ready(set) = &mut self.tags else {
            return None;
        };

        let toggle = set.toggle(tag);
        let request = WriteRequest {
            path,
            tags: set.as_slice().to_vec(),
            removals: toggle.removals().to_vec(),
        };

        self.writing = true;
        Some(request)
    }

    /// Record the end of a write
    pub fn write_finished(&mut self, path: &Path, result: &Result<(), String>) -> AfterWrite {
        self.writing = false;

        match result {
            Ok(()) => AfterWrite::Done,
            Err(_) if path == self.current_path() => {
                // In-memory tags no longer match the file
                AfterWrite::Reload(self.begin_load())
            }
            Err(_) => AfterWrite::Done,
        }
    }
}
