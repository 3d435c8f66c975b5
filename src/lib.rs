//! # dictfile
//!
//! A single-file, multi-index dictionary container: metadata, entry
//! records, provenance records, and search indices in one file, opened
//! instantly and queried without loading the whole file into memory.
//!
//! Entry lists are read lazily through bounded LRU caches; sources and
//! indices are small and held fully in memory. The file carries a trailer
//! sentinel for corruption detection and a versioned header that is
//! rejected fail-fast when unknown.

pub mod dict;

// Re-export the main types for convenience
pub use dict::{
    catalog::{list_status, DictionaryMeta},
    container::{Dictionary, DictionaryBuilder, DEFAULT_CACHE_SIZE, END_OF_DICTIONARY},
    index::{Index, TokenRow},
    raf::{caching::CachingList, write_list, ElementCodec, RafList, RandomAccess},
    types::{
        error::{DictError, Result},
        models::{EntryListKind, EntryRef, EntrySource, FormatVersion, Pair, PairEntry, TextEntry},
    },
};
