//! Token → entry-position index.
//!
//! Indices are decoded once at open time and held fully in memory; lookup
//! never touches the file. Token normalization and ranking are owned by the
//! external index builder; this structure only stores already-normalized
//! tokens and their back-references.

use crate::dict::types::models::EntryRef;

/// One token and the entry positions it resolves to, in relevance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRow {
    pub token: String,
    pub entries: Vec<EntryRef>,
}

/// An eagerly loaded search index over the container's entry lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    /// Short label, e.g. "EN".
    pub short_name: String,
    /// Human-readable direction, e.g. "English -> German".
    pub long_name: String,
    /// Number of main tokens. Absent in version-0 files.
    pub main_token_count: Option<u32>,
    /// Rows sorted by token bytes; lookup is a binary search.
    pub token_rows: Vec<TokenRow>,
}

impl Index {
    /// A fresh, empty index for external builders to populate.
    pub fn new(short_name: impl Into<String>, long_name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            long_name: long_name.into(),
            main_token_count: None,
            token_rows: Vec::new(),
        }
    }

    pub fn token_count(&self) -> usize {
        self.token_rows.len()
    }

    /// Resolve an already-normalized token to its entry positions.
    ///
    /// Returns an empty slice for tokens the index does not know.
    pub fn lookup(&self, token: &str) -> &[EntryRef] {
        match self
            .token_rows
            .binary_search_by(|row| row.token.as_str().cmp(token))
        {
            Ok(i) => &self.token_rows[i].entries,
            Err(_) => &[],
        }
    }
}
