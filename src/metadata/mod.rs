/// Keyword metadata access
///
/// The rest of the app only sees `MetadataStore`. Everything ExifTool
/// specific, including the cp1251 repair heuristic, stays in here:
/// - `exiftool.rs` - the process-backed store
/// - `keywords.rs` - field precedence and output parsing
/// - `encoding.rs` - mojibake repair and the corruption marker
/// - `directives.rs` - argument files for writes

pub mod directives;
pub mod encoding;
pub mod exiftool;
pub mod keywords;

use std::path::Path;

use crate::error::MetadataError;

pub use exiftool::ExifTool;

/// Read and rewrite the keyword tags of an image file
pub trait MetadataStore: Send + Sync {
    /// Current tags of `path`, in the order the file stores them
    fn read_keywords(&self, path: &Path) -> Result<Vec<String>, MetadataError>;

    /// Make the file's keywords exactly `tags`, explicitly dropping `removals`
    fn write_keywords(
        &self,
        path: &Path,
        tags: &[String],
        removals: &[String],
    ) -> Result<(), MetadataError>;
}
