//! Top-level dictionary container: the open/read protocol and the
//! build/write protocol.
//!
//! Section order on disk is fixed and load-bearing:
//!
//! ```text
//! version, timestamp, info, sources, pairEntries, textEntries, indices,
//! trailer sentinel
//! ```
//!
//! Opening reads the header eagerly, materializes the sources, wraps the
//! entry lists in bounded-LRU caches and the indices in an eager cache,
//! then verifies the trailer sentinel. Each section is located by the
//! previous section's recorded end offset, never by trusting the cursor
//! after a lazy wrapper was constructed.
//!
//! The open handle is shared behind one mutex; every seek+read pair runs
//! inside it. Callers wanting parallel readers should open separate
//! handles instead.

use std::fmt;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::info;

use super::format::codecs::{EntrySourceCodec, IndexCodec, PairEntryCodec, TextEntryCodec};
use super::format::primitives::{read_string, write_string};
use super::index::Index;
use super::raf::caching::CachingList;
use super::raf::{write_list, RafList};
use super::types::error::{DictError, Result};
use super::types::models::{EntryListKind, EntrySource, FormatVersion, PairEntry, TextEntry};

/// Fixed literal written at end-of-file, checked byte-for-byte on open.
/// Anything else means the file is truncated or corrupt.
pub const END_OF_DICTIONARY: &str = "END OF DICTIONARY";

/// Default bound for the pair/text entry caches.
pub const DEFAULT_CACHE_SIZE: usize = 5000;

pub type PairList<R> = CachingList<PairEntry, RafList<PairEntry, R, PairEntryCodec>>;
pub type TextList<R> = CachingList<TextEntry, RafList<TextEntry, R, TextEntryCodec>>;
pub type IndexList<R> = CachingList<Index, RafList<Index, R, IndexCodec>>;

/// A dictionary container opened read-only from a random-access handle.
///
/// Entry lists are read-through caches over the immutable file; the
/// indices and sources are held fully in memory.
pub struct Dictionary<R> {
    pub version: FormatVersion,
    /// Creation time, epoch millis.
    pub created_millis: u64,
    /// Free-form description, e.g. "EN-DE".
    pub info: String,
    pub sources: Arc<Vec<EntrySource>>,
    pub pair_entries: PairList<R>,
    pub text_entries: TextList<R>,
    pub indices: IndexList<R>,
}

impl<R: Read + Seek> Dictionary<R> {
    /// Open a container with the default entry-cache bound.
    pub fn open(file: R) -> Result<Self> {
        Self::open_with_cache(file, DEFAULT_CACHE_SIZE)
    }

    /// Open a container, bounding each entry-list cache at `cache_size`
    /// decoded elements.
    pub fn open_with_cache(mut file: R, cache_size: usize) -> Result<Self> {
        // The version is rejected before any further byte is consumed.
        let version = FormatVersion::try_from(file.read_u32::<BigEndian>()?)?;
        let created_millis = file.read_u64::<BigEndian>()?;
        let info = read_string(&mut file)?;
        let header_end = file.stream_position()?;
        let file = Arc::new(Mutex::new(file));

        // Sources are materialized eagerly: entry decoders resolve into
        // them, and reading them later would disrupt the cursor. The
        // cursor is reseeked to the list's recorded end offset; lazy lists
        // must never be trusted to leave it in the right place.
        let source_list = RafList::create(Arc::clone(&file), EntrySourceCodec, header_end)?;
        let sources = Arc::new(source_list.read_all()?);
        let sources_end = source_list.end_offset();
        {
            let mut guard = file.lock().map_err(|_| DictError::LockPoisoned)?;
            guard.seek(SeekFrom::Start(sources_end))?;
        }

        let pair_list = RafList::create(
            Arc::clone(&file),
            PairEntryCodec {
                sources: Arc::clone(&sources),
            },
            sources_end,
        )?;
        let text_list = RafList::create(
            Arc::clone(&file),
            TextEntryCodec {
                sources: Arc::clone(&sources),
            },
            pair_list.end_offset(),
        )?;
        let index_list = RafList::create(
            Arc::clone(&file),
            IndexCodec {
                version,
                pair_count: pair_list.len() as u32,
                text_count: text_list.len() as u32,
            },
            text_list.end_offset(),
        )?;
        let trailer_at = index_list.end_offset();

        let pair_entries = CachingList::new(pair_list, cache_size);
        let text_entries = CachingList::new(text_list, cache_size);
        // Indices are assumed small relative to entry data: decode them
        // once here and never touch the file for them again.
        let indices = CachingList::fully_cached(index_list)?;

        read_trailer(&file, trailer_at)?;

        info!(
            "dictionary opened: version={}, info={:?}, {} sources, {} pair entries, {} text entries, {} indices",
            version,
            info,
            sources.len(),
            pair_entries.len(),
            text_entries.len(),
            indices.len()
        );

        Ok(Self {
            version,
            created_millis,
            info,
            sources,
            pair_entries,
            text_entries,
            indices,
        })
    }
}

/// Section sizes only; entry contents stay on disk.
impl<R: Read + Seek> fmt::Debug for Dictionary<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("version", &self.version)
            .field("created_millis", &self.created_millis)
            .field("info", &self.info)
            .field("sources", &self.sources.len())
            .field("pair_entries", &self.pair_entries.len())
            .field("text_entries", &self.text_entries.len())
            .field("indices", &self.indices.len())
            .finish()
    }
}

fn read_trailer<R: Read + Seek>(file: &Arc<Mutex<R>>, at: u64) -> Result<()> {
    let mut expected = Vec::with_capacity(4 + END_OF_DICTIONARY.len());
    expected.write_u32::<BigEndian>(END_OF_DICTIONARY.len() as u32)?;
    expected.extend_from_slice(END_OF_DICTIONARY.as_bytes());

    let mut guard = file.lock().map_err(|_| DictError::LockPoisoned)?;
    let file_len = guard.seek(SeekFrom::End(0))?;
    if file_len < at || file_len - at < expected.len() as u64 {
        return Err(DictError::Corrupt(
            "file is truncated before the trailer sentinel".to_string(),
        ));
    }
    guard.seek(SeekFrom::Start(at))?;
    let mut actual = vec![0u8; expected.len()];
    guard.read_exact(&mut actual)?;
    if actual != expected {
        return Err(DictError::Corrupt(
            "trailer sentinel mismatch".to_string(),
        ));
    }
    // Trailing bytes beyond the sentinel are not validated.
    Ok(())
}

/// In-memory aggregate that external index builders populate before the
/// single write pass.
///
/// Fresh containers always carry the latest format version;
/// [`with_version`](DictionaryBuilder::with_version) exists for migration
/// tooling and tests that need to emit older layouts.
pub struct DictionaryBuilder {
    pub version: FormatVersion,
    pub created_millis: u64,
    pub info: String,
    pub sources: Vec<EntrySource>,
    pub pair_entries: Vec<PairEntry>,
    pub text_entries: Vec<TextEntry>,
    pub indices: Vec<Index>,
}

impl DictionaryBuilder {
    pub fn new(info: impl Into<String>) -> Self {
        let created_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            version: FormatVersion::LATEST,
            created_millis,
            info: info.into(),
            sources: Vec::new(),
            pair_entries: Vec::new(),
            text_entries: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: FormatVersion) -> Self {
        self.version = version;
        self
    }

    /// Append a provenance record; returns its position for entries to
    /// reference.
    pub fn add_source(&mut self, source: EntrySource) -> usize {
        self.sources.push(source);
        self.sources.len() - 1
    }

    /// Append a bilingual entry; returns its position for indices to
    /// reference.
    pub fn add_pair_entry(&mut self, entry: PairEntry) -> usize {
        self.pair_entries.push(entry);
        self.pair_entries.len() - 1
    }

    /// Append a free-text entry; returns its position for indices to
    /// reference.
    pub fn add_text_entry(&mut self, entry: TextEntry) -> usize {
        self.text_entries.push(entry);
        self.text_entries.len() - 1
    }

    pub fn add_index(&mut self, index: Index) {
        self.indices.push(index);
    }

    /// Serialize the whole container in one sequential pass.
    ///
    /// The writer never seeks, so any `Write` sink works. Referential
    /// integrity is validated first: emitting a dangling back-reference
    /// would produce exactly the file the reader must refuse.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.validate()?;
        writer.write_u32::<BigEndian>(self.version.raw())?;
        writer.write_u64::<BigEndian>(self.created_millis)?;
        write_string(writer, &self.info)?;

        let sources = Arc::new(self.sources.clone());
        write_list(writer, &self.sources, &EntrySourceCodec)?;
        write_list(
            writer,
            &self.pair_entries,
            &PairEntryCodec {
                sources: Arc::clone(&sources),
            },
        )?;
        write_list(writer, &self.text_entries, &TextEntryCodec { sources })?;
        write_list(
            writer,
            &self.indices,
            &IndexCodec {
                version: self.version,
                pair_count: self.pair_entries.len() as u32,
                text_count: self.text_entries.len() as u32,
            },
        )?;
        write_string(writer, END_OF_DICTIONARY)?;

        info!(
            "dictionary written: version={}, info={:?}, {} pair entries, {} text entries, {} indices",
            self.version,
            self.info,
            self.pair_entries.len(),
            self.text_entries.len(),
            self.indices.len()
        );
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for (i, entry) in self.pair_entries.iter().enumerate() {
            if usize::from(entry.source) >= self.sources.len() {
                return Err(DictError::Corrupt(format!(
                    "pair entry {} references source {} but only {} sources exist",
                    i,
                    entry.source,
                    self.sources.len()
                )));
            }
        }
        for (i, entry) in self.text_entries.iter().enumerate() {
            if usize::from(entry.source) >= self.sources.len() {
                return Err(DictError::Corrupt(format!(
                    "text entry {} references source {} but only {} sources exist",
                    i,
                    entry.source,
                    self.sources.len()
                )));
            }
        }
        for index in &self.indices {
            if self.version.has_token_counts() && index.main_token_count.is_none() {
                return Err(DictError::Corrupt(format!(
                    "index {} has no main token count, required by version {}",
                    index.short_name, self.version
                )));
            }
            if index
                .token_rows
                .windows(2)
                .any(|w| w[1].token < w[0].token)
            {
                return Err(DictError::Corrupt(format!(
                    "index {} tokens are not sorted",
                    index.short_name
                )));
            }
            for row in &index.token_rows {
                for entry in &row.entries {
                    let limit = match entry.kind {
                        EntryListKind::Pair => self.pair_entries.len(),
                        EntryListKind::Text => self.text_entries.len(),
                    };
                    if entry.position as usize >= limit {
                        return Err(DictError::Corrupt(format!(
                            "index {} token {:?} references {:?} entry {} but only {} exist",
                            index.short_name, row.token, entry.kind, entry.position, limit
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
