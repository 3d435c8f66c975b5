//! On-disk random-access list primitive.
//!
//! A list is stored as an offset table followed by the element bytes:
//!
//! ```text
//! [u32 count]
//! [u64 offsets[count + 1]]   relative to the first element byte;
//!                            offsets[count] is the total data length
//! [element bytes, back to back]
//! ```
//!
//! `get(i)` seeks directly to the recorded offset and decodes exactly one
//! element; `len()` never decodes anything. The extra trailing offset makes
//! every element length and the section end computable from the table alone,
//! so a container can skip the whole list without touching its contents.
//!
//! All reads go through a shared `Arc<Mutex<_>>` handle: seek and read are
//! one critical section, so concurrent readers of the same handle cannot
//! interleave and read the wrong offset.

pub mod caching;

use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, trace};

use crate::dict::types::error::{DictError, Result};

/// Per-element serialization seam for [`RafList`].
///
/// `read` must consume exactly the bytes `write` produced for the same
/// element; `get` verifies this against the offset table and reports a
/// mismatch as corruption.
pub trait ElementCodec<T> {
    fn read<R: Read>(&self, reader: &mut R) -> Result<T>;
    fn write<W: Write>(&self, writer: &mut W, value: &T) -> Result<()>;
}

/// A finite, positionally addressable source of elements.
///
/// Implemented by [`RafList`]; the caching decorator accepts anything that
/// satisfies this contract, which keeps the cache testable against
/// in-memory fakes.
pub trait RandomAccess<T> {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Fetch the element at `index`. May block on file I/O.
    fn fetch(&self, index: usize) -> Result<T>;
}

/// A lazily read on-disk list over a shared random-access handle.
#[derive(Debug)]
pub struct RafList<T, R, C> {
    file: Arc<Mutex<R>>,
    codec: C,
    /// Absolute offset of the first element byte (right after the table).
    base: u64,
    /// `count + 1` offsets relative to `base`; the last is the data length.
    offsets: Vec<u64>,
    /// Absolute offset of the first byte after this list.
    end: u64,
    _element: PhantomData<fn() -> T>,
}

impl<T, R: Read + Seek, C: ElementCodec<T>> RafList<T, R, C> {
    /// Read a list previously written at `start`.
    ///
    /// The offset table is read and validated eagerly; no element is
    /// decoded. A table that does not fit in the file, does not start at
    /// zero, or is not monotone is reported as corruption.
    pub fn create(file: Arc<Mutex<R>>, codec: C, start: u64) -> Result<Self> {
        let (offsets, base, end) = {
            let mut guard = file.lock().map_err(|_| DictError::LockPoisoned)?;
            let file_len = guard.seek(SeekFrom::End(0))?;
            if start > file_len || file_len - start < 4 {
                return Err(DictError::Corrupt(format!(
                    "list header at {} extends past end of file ({} bytes)",
                    start, file_len
                )));
            }
            guard.seek(SeekFrom::Start(start))?;
            let count = guard.read_u32::<BigEndian>()? as u64;
            let table_len = (count + 1) * 8;
            if file_len - start - 4 < table_len {
                return Err(DictError::Corrupt(format!(
                    "offset table for {} elements extends past end of file",
                    count
                )));
            }
            let mut offsets = Vec::with_capacity(count as usize + 1);
            for _ in 0..=count {
                offsets.push(guard.read_u64::<BigEndian>()?);
            }
            if offsets[0] != 0 {
                return Err(DictError::Corrupt(format!(
                    "offset table does not start at zero (found {})",
                    offsets[0]
                )));
            }
            if offsets.windows(2).any(|w| w[1] < w[0]) {
                return Err(DictError::Corrupt(
                    "offset table is not monotone".to_string(),
                ));
            }
            let base = start + 4 + table_len;
            let data_len = *offsets.last().expect("table holds count + 1 offsets");
            let end = base.checked_add(data_len).ok_or_else(|| {
                DictError::Corrupt("offset table overflows the file address space".to_string())
            })?;
            if end > file_len {
                return Err(DictError::Corrupt(format!(
                    "element data ends at {} but the file is only {} bytes",
                    end, file_len
                )));
            }
            (offsets, base, end)
        };
        debug!(
            "random-access list at {}: {} elements, data {}..{}",
            start,
            offsets.len() - 1,
            base,
            end
        );
        Ok(Self {
            file,
            codec,
            base,
            offsets,
            end,
            _element: PhantomData,
        })
    }

    /// Element count. O(1), never decodes an element.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Absolute offset of the first byte after this list. The container uses
    /// this to position the next section without decoding this one.
    pub fn end_offset(&self) -> u64 {
        self.end
    }

    /// Decode the element at `index`, reading only that element's bytes.
    pub fn get(&self, index: usize) -> Result<T> {
        let len = self.len();
        if index >= len {
            return Err(DictError::OutOfRange { index, len });
        }
        let start = self.base + self.offsets[index];
        let expected = self.offsets[index + 1] - self.offsets[index];
        trace!("fetching element {} ({} bytes at {})", index, expected, start);
        let mut guard = self.file.lock().map_err(|_| DictError::LockPoisoned)?;
        guard.seek(SeekFrom::Start(start))?;
        let value = self.codec.read(&mut *guard)?;
        let found = guard
            .stream_position()?
            .checked_sub(start)
            .ok_or_else(|| {
                DictError::Corrupt("element decoder moved the cursor backwards".to_string())
            })?;
        if found != expected {
            return Err(DictError::SizeMismatch {
                context: "list element",
                expected,
                found,
            });
        }
        Ok(value)
    }

    /// Decode every element front to back. Used to materialize small lists.
    pub fn read_all(&self) -> Result<Vec<T>> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }
}

impl<T, R: Read + Seek, C: ElementCodec<T>> RandomAccess<T> for RafList<T, R, C> {
    fn len(&self) -> usize {
        RafList::len(self)
    }

    fn fetch(&self, index: usize) -> Result<T> {
        self.get(index)
    }
}

/// Serialize a list of elements at the writer's current position.
///
/// Two-pass: elements are serialized to a scratch buffer first so their
/// sizes are known, then the table and the buffer are emitted in one
/// streaming write. The writer never needs to seek.
pub fn write_list<T, C: ElementCodec<T>, W: Write>(
    writer: &mut W,
    elements: &[T],
    codec: &C,
) -> Result<()> {
    let mut scratch = Vec::new();
    let mut offsets = Vec::with_capacity(elements.len() + 1);
    offsets.push(0u64);
    for element in elements {
        codec.write(&mut scratch, element)?;
        offsets.push(scratch.len() as u64);
    }
    let count = u32::try_from(elements.len())
        .map_err(|_| DictError::Corrupt("list exceeds u32 element count".to_string()))?;
    writer.write_u32::<BigEndian>(count)?;
    for offset in &offsets {
        writer.write_u64::<BigEndian>(*offset)?;
    }
    writer.write_all(&scratch)?;
    Ok(())
}
