//! Low-level wire primitives shared by every codec.
//!
//! All fixed-width fields in the container are big-endian; strings are a
//! `u32` byte length followed by UTF-8 bytes.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::dict::types::error::{DictError, Result};

/// Upper bound on a single string field. A length prefix beyond this is
/// treated as corruption rather than an allocation request.
const MAX_STRING_LEN: usize = 1 << 28;

/// Read a length-prefixed UTF-8 string.
pub fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let len = reader.read_u32::<BigEndian>()? as usize;
    if len > MAX_STRING_LEN {
        return Err(DictError::Corrupt(format!(
            "string length {} exceeds the {} byte limit",
            len, MAX_STRING_LEN
        )));
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| DictError::Corrupt(format!("invalid UTF-8 in string field: {}", e)))
}

/// Write a length-prefixed UTF-8 string.
pub fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<()> {
    let len = u32::try_from(value.len())
        .map_err(|_| DictError::Corrupt("string field exceeds u32 length range".to_string()))?;
    writer.write_u32::<BigEndian>(len)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}
