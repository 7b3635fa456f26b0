// Copyright 2025 coffview Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use scroll::{Pread, LE};

use crate::common::*;

/// The COFF string table, holding names too long for the 8-byte header fields.
///
/// The table sits immediately after the symbol table and starts with a `u32`
/// declaring how many bytes of NUL-terminated strings follow it. [`StringRef`]
/// offsets index into those string bytes. Files without a symbol table have an
/// empty string table.
///
/// Use [`ObjectFile::string_table`](crate::ObjectFile::string_table) to obtain
/// an instance.
#[derive(Debug, Default)]
pub struct StringTable<'o> {
    data: &'o [u8],
}

impl<'o> StringTable<'o> {
    /// Parses the string table at `offset` within `file`.
    ///
    /// The declared byte count must fit inside the file; a count that runs
    /// past the end means the locating header was bogus.
    pub(crate) fn parse(file: &'o [u8], offset: usize) -> Result<Self> {
        if offset + 4 > file.len() {
            return Err(Error::MalformedHeader(
                "string table offset is outside the file",
            ));
        }

        let length = file.pread_with::<u32>(offset, LE)? as usize;
        let start = offset + 4;
        if length > file.len() - start {
            return Err(Error::MalformedHeader(
                "string table length runs past the end of the file",
            ));
        }

        Ok(StringTable {
            data: &file[start..start + length],
        })
    }

    /// An empty table, for files that carry no symbol table at all.
    pub(crate) fn empty() -> Self {
        StringTable { data: &[] }
    }

    /// Returns the number of string bytes in this table.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether this table contains no strings.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Resolves a string by its byte offset within the table.
    pub fn get(&self, offset: StringRef) -> Result<RawString<'o>> {
        let index = offset.0 as usize;
        if index >= self.data.len() {
            return Err(Error::NameOffsetOutOfRange(offset.0));
        }

        let tail = &self.data[index..];
        match tail.iter().position(|ch| *ch == 0) {
            Some(end) => Ok(RawString::from(&tail[..end])),
            None => Err(Error::UnterminatedString(index)),
        }
    }
}

/// Returns the inline portion of an 8-byte name field, trimming NUL padding.
///
/// There is no terminator when the name occupies all eight bytes.
fn inline_name(raw: &[u8; 8]) -> RawString<'_> {
    let end = raw.iter().position(|ch| *ch == 0).unwrap_or(raw.len());
    RawString::from(&raw[..end])
}

/// Resolves an 8-byte name field from a section header or symbol record.
///
/// Three encodings exist and are tried in order. When the first four bytes
/// are all zero, the last four hold a little-endian offset counted from the
/// string table's length prefix; the first actual string byte is at offset 4.
/// When the field starts with a forward slash, the remaining bytes spell an
/// ASCII decimal offset into the string bytes, with no reduction. Any other
/// field holds the name inline, NUL-padded.
pub(crate) fn parse_name<'a>(raw: &'a [u8; 8], strings: &StringTable<'a>) -> Result<RawString<'a>> {
    if raw[..4] == [0, 0, 0, 0] {
        let offset = raw.pread_with::<u32>(4, LE)?;
        return match offset.checked_sub(4) {
            Some(reduced) => strings.get(StringRef(reduced)),
            None => Err(Error::NameOffsetOutOfRange(offset)),
        };
    }

    if raw[0] == b'/' {
        let digits = inline_name(raw);
        let digits = &digits.as_bytes()[1..];
        if digits.is_empty() {
            return Err(Error::InvalidNameEncoding);
        }

        let mut offset: u32 = 0;
        for &ch in digits {
            if !ch.is_ascii_digit() {
                return Err(Error::InvalidNameEncoding);
            }
            offset = offset.wrapping_mul(10).wrapping_add(u32::from(ch - b'0'));
        }

        return strings.get(StringRef(offset));
    }

    Ok(inline_name(raw))
}
