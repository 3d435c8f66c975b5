//! Core dictionary container module.

pub mod catalog;
pub mod container;
pub mod format;
pub mod index;
pub mod raf;
pub mod types;

pub use container::{Dictionary, DictionaryBuilder, DEFAULT_CACHE_SIZE, END_OF_DICTIONARY};
pub use types::error::{DictError, Result};
