//! Element codecs for the container's list sections.
//!
//! Entry codecs are handed an explicit shared reference to the already
//! materialized sources list, never to the container being constructed;
//! this is legal because sources precede entries in file order. The index
//! codec carries the entry-list lengths so every back-reference is checked
//! during decode.

use std::io::{Read, Write};
use std::sync::Arc;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::dict::index::{Index, TokenRow};
use crate::dict::raf::ElementCodec;
use crate::dict::types::error::{DictError, Result};
use crate::dict::types::models::{
    EntryListKind, EntryRef, EntrySource, FormatVersion, Pair, PairEntry, TextEntry,
};

use super::primitives::{read_string, write_string};

/// `[string name][u32 entryCount]`
pub struct EntrySourceCodec;

impl ElementCodec<EntrySource> for EntrySourceCodec {
    fn read<R: Read>(&self, reader: &mut R) -> Result<EntrySource> {
        let name = read_string(reader)?;
        let entry_count = reader.read_u32::<BigEndian>()?;
        Ok(EntrySource { name, entry_count })
    }

    fn write<W: Write>(&self, writer: &mut W, value: &EntrySource) -> Result<()> {
        write_string(writer, &value.name)?;
        writer.write_u32::<BigEndian>(value.entry_count)?;
        Ok(())
    }
}

fn read_source_index<R: Read>(reader: &mut R, sources: &[EntrySource]) -> Result<u16> {
    let source = reader.read_u16::<BigEndian>()?;
    if usize::from(source) >= sources.len() {
        return Err(DictError::Corrupt(format!(
            "entry references source {} but only {} sources exist",
            source,
            sources.len()
        )));
    }
    Ok(source)
}

/// `[u16 sourceIndex][u32 pairCount][Pair...]`
pub struct PairEntryCodec {
    pub sources: Arc<Vec<EntrySource>>,
}

impl ElementCodec<PairEntry> for PairEntryCodec {
    fn read<R: Read>(&self, reader: &mut R) -> Result<PairEntry> {
        let source = read_source_index(reader, &self.sources)?;
        let count = reader.read_u32::<BigEndian>()? as usize;
        let mut pairs = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let lang1 = read_string(reader)?;
            let lang2 = read_string(reader)?;
            pairs.push(Pair { lang1, lang2 });
        }
        Ok(PairEntry { source, pairs })
    }

    fn write<W: Write>(&self, writer: &mut W, value: &PairEntry) -> Result<()> {
        writer.write_u16::<BigEndian>(value.source)?;
        writer.write_u32::<BigEndian>(value.pairs.len() as u32)?;
        for pair in &value.pairs {
            write_string(writer, &pair.lang1)?;
            write_string(writer, &pair.lang2)?;
        }
        Ok(())
    }
}

/// `[u16 sourceIndex][string text]`
pub struct TextEntryCodec {
    pub sources: Arc<Vec<EntrySource>>,
}

impl ElementCodec<TextEntry> for TextEntryCodec {
    fn read<R: Read>(&self, reader: &mut R) -> Result<TextEntry> {
        let source = read_source_index(reader, &self.sources)?;
        let text = read_string(reader)?;
        Ok(TextEntry { source, text })
    }

    fn write<W: Write>(&self, writer: &mut W, value: &TextEntry) -> Result<()> {
        writer.write_u16::<BigEndian>(value.source)?;
        write_string(writer, &value.text)?;
        Ok(())
    }
}

/// `[string shortName][string longName]` + v1-only `[u32 mainTokenCount]`
/// + `[u32 rowCount][TokenRow...]`
pub struct IndexCodec {
    pub version: FormatVersion,
    pub pair_count: u32,
    pub text_count: u32,
}

impl IndexCodec {
    fn read_entry_ref<R: Read>(&self, reader: &mut R) -> Result<EntryRef> {
        let kind = EntryListKind::try_from(reader.read_u8()?)?;
        let position = reader.read_u32::<BigEndian>()?;
        let limit = match kind {
            EntryListKind::Pair => self.pair_count,
            EntryListKind::Text => self.text_count,
        };
        if position >= limit {
            return Err(DictError::Corrupt(format!(
                "index references {:?} entry {} but only {} exist",
                kind, position, limit
            )));
        }
        Ok(EntryRef { kind, position })
    }
}

impl ElementCodec<Index> for IndexCodec {
    fn read<R: Read>(&self, reader: &mut R) -> Result<Index> {
        let short_name = read_string(reader)?;
        let long_name = read_string(reader)?;
        let main_token_count = if self.version.has_token_counts() {
            Some(reader.read_u32::<BigEndian>()?)
        } else {
            None
        };
        let row_count = reader.read_u32::<BigEndian>()? as usize;
        let mut token_rows = Vec::with_capacity(row_count.min(4096));
        for _ in 0..row_count {
            let token = read_string(reader)?;
            let ref_count = reader.read_u32::<BigEndian>()? as usize;
            let mut entries = Vec::with_capacity(ref_count.min(1024));
            for _ in 0..ref_count {
                entries.push(self.read_entry_ref(reader)?);
            }
            token_rows.push(TokenRow { token, entries });
        }
        if token_rows.windows(2).any(|w| w[1].token < w[0].token) {
            return Err(DictError::Corrupt(format!(
                "index {} tokens are not sorted",
                short_name
            )));
        }
        Ok(Index {
            short_name,
            long_name,
            main_token_count,
            token_rows,
        })
    }

    fn write<W: Write>(&self, writer: &mut W, value: &Index) -> Result<()> {
        write_string(writer, &value.short_name)?;
        write_string(writer, &value.long_name)?;
        if self.version.has_token_counts() {
            // Substituting a fallback here would make the reopened index
            // disagree with the one that was written.
            let count = value.main_token_count.ok_or_else(|| {
                DictError::Corrupt(format!(
                    "index {} has no main token count, required by version {}",
                    value.short_name, self.version
                ))
            })?;
            writer.write_u32::<BigEndian>(count)?;
        }
        writer.write_u32::<BigEndian>(value.token_rows.len() as u32)?;
        for row in &value.token_rows {
            write_string(writer, &row.token)?;
            writer.write_u32::<BigEndian>(row.entries.len() as u32)?;
            for entry in &row.entries {
                writer.write_u8(entry.kind.tag())?;
                writer.write_u32::<BigEndian>(entry.position)?;
            }
        }
        Ok(())
    }
}
