// Copyright 2025 coffview Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::fmt;

use crate::common::*;
use crate::strings::{parse_name, StringTable};
use crate::FallibleIterator;

/// Size of one symbol table record in bytes. Auxiliary records have the same
/// size but no fixed layout of their own.
const SYMBOL_RECORD_SIZE: usize = 18;

/// The section number of an absolute symbol.
pub const IMAGE_SYM_ABSOLUTE: i16 = -1;
/// The section number of a debugging symbol, such as a file name.
pub const IMAGE_SYM_DEBUG: i16 = -2;
/// The section number of an undefined external symbol.
pub const IMAGE_SYM_UNDEFINED: i16 = 0;

/// One record from the COFF symbol table.
///
/// Each symbol may be followed by auxiliary records which extend it; the
/// iterator skips those, so `number_of_aux_symbols` only reports how many
/// were attached.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct CoffSymbol {
    /// The raw 8-byte name field. Use [`name`](Self::name) to resolve it.
    pub name: [u8; 8],

    /// The meaning depends on the section number and storage class; for
    /// defined symbols this is the offset within the section.
    pub value: u32,

    /// One-based index of the section this symbol belongs to, or one of
    /// [`IMAGE_SYM_ABSOLUTE`], [`IMAGE_SYM_DEBUG`] and [`IMAGE_SYM_UNDEFINED`].
    pub section_number: i16,

    /// The symbol type. Microsoft tools only distinguish function (0x20)
    /// from not-a-function (0).
    pub symbol_type: u16,

    /// The storage class, an `IMAGE_SYM_CLASS_` value.
    pub storage_class: u8,

    /// The number of auxiliary records following this one.
    pub number_of_aux_symbols: u8,
}

impl CoffSymbol {
    fn parse(buf: &mut ParseBuffer<'_>) -> Result<Self> {
        let name_bytes = buf.take(8)?;
        let mut name = [0u8; 8];
        name.copy_from_slice(name_bytes);

        Ok(Self {
            name,
            value: buf.parse_u32()?,
            section_number: buf.parse_i16()?,
            symbol_type: buf.parse_u16()?,
            storage_class: buf.parse_u8()?,
            number_of_aux_symbols: buf.parse_u8()?,
        })
    }

    /// Resolves this symbol's name against the string table.
    pub fn name<'a>(&'a self, strings: &StringTable<'a>) -> Result<RawString<'a>> {
        parse_name(&self.name, strings)
    }
}

impl fmt::Debug for CoffSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoffSymbol")
            .field("name", &RawString::from(&self.name[..]))
            .field("value", &format_args!("{:#x}", self.value))
            .field("section_number", &self.section_number)
            .field("symbol_type", &format_args!("{:#x}", self.symbol_type))
            .field("storage_class", &self.storage_class)
            .field("number_of_aux_symbols", &self.number_of_aux_symbols)
            .finish()
    }
}

/// A source of [`CoffSymbol`]s from the COFF symbol table.
///
/// Auxiliary records are consumed along with the symbol that owns them and
/// never yielded, so the number of items is usually smaller than the header's
/// symbol count.
#[derive(Debug)]
pub struct CoffSymbolIter<'t> {
    buf: ParseBuffer<'t>,
}

impl<'t> CoffSymbolIter<'t> {
    pub(crate) fn new(buf: ParseBuffer<'t>) -> Self {
        CoffSymbolIter { buf }
    }
}

impl<'t> FallibleIterator for CoffSymbolIter<'t> {
    type Item = CoffSymbol;
    type Error = Error;

    fn next(&mut self) -> Result<Option<Self::Item>> {
        if self.buf.is_empty() {
            return Ok(None);
        }

        let symbol = CoffSymbol::parse(&mut self.buf)?;
        self.buf
            .skip(usize::from(symbol.number_of_aux_symbols) * SYMBOL_RECORD_SIZE)?;
        Ok(Some(symbol))
    }
}
