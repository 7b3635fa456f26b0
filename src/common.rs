// Copyright 2025 coffview Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::borrow::Cow;
use std::fmt;
use std::mem;
use std::result;

use scroll::ctx::TryFromCtx;
use scroll::{Endian, Pread, LE};

/// `TypeIndex` refers to a type record by its position-derived identifier.
///
/// Type records in a `.debug$T` stream are implicitly numbered upwards from
/// 0x1000 in encounter order; other records reference them by this number.
pub type TypeIndex = u32;

/// `IdIndex` refers to an id record (string ids, build info arguments) the
/// same way `TypeIndex` refers to a type.
pub type IdIndex = u32;

/// A reference into a string table, stored as a byte offset.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StringRef(pub u32);

impl fmt::Display for StringRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl fmt::Debug for StringRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringRef({})", self)
    }
}

/// An error that occurred while decoding an object file.
///
/// Fatal conditions carry the absolute byte offset at which they were
/// detected. Unrecognized record, leaf, subsection and checksum kinds are
/// deliberately *not* errors; they decode to tagged "unknown" values so that
/// output of newer producers keeps decoding.
#[derive(Debug)]
pub enum Error {
    /// A read would run past the end of the available bytes.
    TruncatedInput(usize),

    /// A subsection's declared byte count runs past the end of its stream.
    TruncatedSubsection(usize),

    /// A header-derived offset or length falls outside the file buffer.
    MalformedHeader(&'static str),

    /// A NUL-terminated field has no terminator before the buffer end.
    UnterminatedString(usize),

    /// A name's string-table offset is not within the string table.
    NameOffsetOutOfRange(u32),

    /// A `/offset` style section name contains a non-digit character.
    InvalidNameEncoding,

    /// A stream's leading signature does not match the expected constant.
    UnsupportedSignature { expected: u32, actual: u32 },

    /// A symbol record's length value was impossibly small.
    SymbolTooShort(usize),

    /// A type record's length value was impossibly small.
    TypeTooShort(usize),

    /// A parse error from scroll.
    ScrollError(scroll::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::TruncatedInput(offset) => {
                write!(f, "unexpected end of input at offset {:#x}", offset)
            }
            Error::TruncatedSubsection(offset) => write!(
                f,
                "subsection at offset {:#x} runs past the end of its stream",
                offset
            ),
            Error::MalformedHeader(reason) => write!(f, "malformed COFF header: {}", reason),
            Error::UnterminatedString(offset) => write!(
                f,
                "string at offset {:#x} is missing its terminator",
                offset
            ),
            Error::NameOffsetOutOfRange(offset) => {
                write!(f, "name offset {:#x} is outside the string table", offset)
            }
            Error::InvalidNameEncoding => write!(f, "section name offset is not decimal"),
            Error::UnsupportedSignature { expected, actual } => write!(
                f,
                "stream signature {:#x} does not match the expected {:#x}",
                actual, expected
            ),
            Error::SymbolTooShort(offset) => write!(
                f,
                "symbol record at offset {:#x} declares an impossibly small length",
                offset
            ),
            Error::TypeTooShort(offset) => write!(
                f,
                "type record at offset {:#x} declares an impossibly small length",
                offset
            ),
            Error::ScrollError(ref e) => write!(f, "parse error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<scroll::Error> for Error {
    fn from(e: scroll::Error) -> Self {
        match e {
            // Bounds violations map onto the truncation variant; scroll only
            // knows record-relative offsets, so absolute offsets are supplied
            // by `ParseBuffer` wherever it performs the check itself.
            scroll::Error::BadOffset(offset) => Error::TruncatedInput(offset),
            scroll::Error::TooBig { .. } => Error::TruncatedInput(0),
            _ => Error::ScrollError(e),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Provides bounds-checked little-endian access to a `&[u8]`.
///
/// A `ParseBuffer` remembers the absolute offset of its first byte so that
/// errors report positions within the whole file rather than within the
/// sub-slice currently being decoded.
#[derive(Debug, Clone, Default)]
pub struct ParseBuffer<'b> {
    data: &'b [u8],
    pos: usize,
    base: usize,
}

macro_rules! def_parse {
    ( $( ($n:ident, $t:ty) ),* $(,)* ) => {
        $(#[doc(hidden)]
          #[inline]
          pub fn $n(&mut self) -> Result<$t> {
              if self.len() < mem::size_of::<$t>() {
                  return Err(Error::TruncatedInput(self.offset()));
              }
              Ok(self.data.gread_with(&mut self.pos, LE)?)
          })*
    }
}

macro_rules! def_peek {
    ( $( ($n:ident, $t:ty) ),* $(,)* ) => {
        $(#[doc(hidden)]
          #[inline]
          pub fn $n(&self) -> Result<$t> {
              if self.len() < mem::size_of::<$t>() {
                  return Err(Error::TruncatedInput(self.offset()));
              }
              Ok(self.data.pread_with(self.pos, LE)?)
          })*
    }
}

impl<'b> ParseBuffer<'b> {
    /// Wrap a slice whose first byte lives at `base` within the file.
    pub fn with_offset(data: &'b [u8], base: usize) -> Self {
        ParseBuffer { data, pos: 0, base }
    }

    /// Return the remaining length of the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns whether the buffer has been consumed entirely.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the position within the wrapped slice.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Return the absolute position within the file.
    #[inline]
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Round the position up to the next multiple of `alignment` bytes.
    ///
    /// Never advances past the end of the buffer; aligning at the very end of
    /// a stream is a no-op rather than an error.
    #[inline]
    pub fn align(&mut self, alignment: usize) {
        let diff = self.pos % alignment;
        if diff > 0 {
            self.pos = usize::min(self.pos + alignment - diff, self.data.len());
        }
    }

    /// Parse any fixed-layout little-endian record.
    pub fn parse<T>(&mut self) -> Result<T>
    where
        T: TryFromCtx<'b, Endian, [u8], Error = scroll::Error>,
    {
        Ok(self.data.gread_with(&mut self.pos, LE)?)
    }

    def_parse!(
        (parse_u8, u8),
        (parse_u16, u16),
        (parse_i16, i16),
        (parse_u32, u32),
        (parse_i32, i32),
        (parse_u64, u64),
    );

    def_peek!((peek_u8, u8), (peek_u16, u16),);

    /// Parse a NUL-terminated string and advance past the terminator.
    #[inline]
    pub fn parse_cstring(&mut self) -> Result<RawString<'b>> {
        let input = &self.data[self.pos..];
        match input.iter().position(|ch| *ch == 0) {
            Some(idx) => {
                self.pos += idx + 1;
                Ok(RawString::from(&input[..idx]))
            }
            None => Err(Error::UnterminatedString(self.offset())),
        }
    }

    /// Take `n` bytes from the input.
    #[inline]
    pub fn take(&mut self, n: usize) -> Result<&'b [u8]> {
        let input = &self.data[self.pos..];
        if input.len() < n {
            return Err(Error::TruncatedInput(self.offset()));
        }
        self.pos += n;
        Ok(&input[..n])
    }

    /// Advance past `n` bytes without looking at them.
    #[inline]
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }
}

impl<'b> From<&'b [u8]> for ParseBuffer<'b> {
    fn from(data: &'b [u8]) -> Self {
        ParseBuffer { data, pos: 0, base: 0 }
    }
}

/// `RawString` refers to a `&[u8]` that physically resides somewhere inside
/// the object file.
///
/// A `RawString` may not be valid UTF-8.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawString<'b>(&'b [u8]);

impl<'b> fmt::Debug for RawString<'b> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawString::from({:?})", self.to_string())
    }
}

impl<'b> fmt::Display for RawString<'b> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string())
    }
}

impl<'b> RawString<'b> {
    /// Return the raw bytes of this string, as found in the file.
    #[inline]
    pub fn as_bytes(&self) -> &'b [u8] {
        self.0
    }

    /// Return the length of this string in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether this string is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a UTF-8 `String`, substituting replacement characters as
    /// needed.
    ///
    /// Names in object files are almost always printable 7-bit ASCII, so
    /// this is borrow-only in the expected case.
    #[inline]
    #[allow(clippy::inherent_to_string_shadow_display)]
    pub fn to_string(&self) -> Cow<'b, str> {
        String::from_utf8_lossy(self.0)
    }
}

impl<'b> From<&'b str> for RawString<'b> {
    fn from(s: &'b str) -> Self {
        RawString(s.as_bytes())
    }
}

impl<'b> From<&'b [u8]> for RawString<'b> {
    fn from(data: &'b [u8]) -> Self {
        RawString(data)
    }
}
