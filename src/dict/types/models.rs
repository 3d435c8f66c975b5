//! Data structures representing the persisted dictionary records.

use super::error::{DictError, Result};

/// Known on-disk format versions.
///
/// The version is the very first field of the file and gates which optional
/// sub-fields are present. Anything outside the known range is rejected
/// before any further byte is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    V0,
    V1,
}

impl FormatVersion {
    /// The version written for freshly built dictionaries.
    pub const LATEST: FormatVersion = FormatVersion::V1;

    /// Whether indices carry a per-index main token count (added in v1).
    pub fn has_token_counts(&self) -> bool {
        matches!(self, FormatVersion::V1)
    }

    /// The raw integer stored in the file.
    pub fn raw(&self) -> u32 {
        match self {
            FormatVersion::V0 => 0,
            FormatVersion::V1 => 1,
        }
    }
}

impl TryFrom<u32> for FormatVersion {
    type Error = DictError;
    fn try_from(v: u32) -> Result<Self> {
        match v {
            0 => Ok(Self::V0),
            1 => Ok(Self::V1),
            other => Err(DictError::UnsupportedVersion(other)),
        }
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw())
    }
}

/// A provenance record: where a batch of entries originated.
///
/// Sources are small and used everywhere (entry decoders resolve into them),
/// so the container materializes them eagerly on open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySource {
    pub name: String,
    /// Number of entries contributed by this source.
    pub entry_count: u32,
}

/// One translation pairing inside a [`PairEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub lang1: String,
    pub lang2: String,
}

/// A bilingual entry: one or more translation pairs from a single source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairEntry {
    /// Position of this entry's provenance record in the sources list.
    pub source: u16,
    pub pairs: Vec<Pair>,
}

/// A free-text entry (definition, usage note) from a single source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    pub source: u16,
    pub text: String,
}

/// Which entry list an [`EntryRef`] points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryListKind {
    Pair,
    Text,
}

impl EntryListKind {
    /// The tag byte stored in the file.
    pub fn tag(&self) -> u8 {
        match self {
            EntryListKind::Pair => 0,
            EntryListKind::Text => 1,
        }
    }
}

impl TryFrom<u8> for EntryListKind {
    type Error = DictError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Pair),
            1 => Ok(Self::Text),
            _ => Err(DictError::Corrupt(format!(
                "unknown entry list tag: {}",
                value
            ))),
        }
    }
}

/// A back-reference from an index into one of the entry lists.
///
/// Indices never store entry copies, only positions; the entry list itself
/// is the single source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRef {
    pub kind: EntryListKind,
    pub position: u32,
}
