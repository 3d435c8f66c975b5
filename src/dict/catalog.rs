//! Known-dictionary metadata records.
//!
//! These records live outside the container format: they only track a
//! display name and a local file path. The presentation layer derives its
//! `(displayName, isReadableOnDisk)` listing from them and opens a
//! container once a record supplies a path. The listing is a pure function
//! of the records; after a settings change the caller simply re-invokes it
//! rather than reacting to process-wide state.

use std::fs::File;
use std::path::PathBuf;

use super::container::Dictionary;
use super::types::error::Result;

/// One known dictionary: display name plus where its container file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryMeta {
    pub display_name: String,
    pub path: PathBuf,
}

impl DictionaryMeta {
    pub fn new(display_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            display_name: display_name.into(),
            path: path.into(),
        }
    }

    /// Whether the container file is present and readable right now.
    pub fn is_readable_on_disk(&self) -> bool {
        File::open(&self.path).is_ok()
    }

    /// Open the container this record points at.
    pub fn open(&self) -> Result<Dictionary<File>> {
        Dictionary::open(File::open(&self.path)?)
    }
}

/// Status tuples for a listing surface.
pub fn list_status(metas: &[DictionaryMeta]) -> Vec<(String, bool)> {
    metas
        .iter()
        .map(|meta| (meta.display_name.clone(), meta.is_readable_on_disk()))
        .collect()
}
