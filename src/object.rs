// Copyright 2025 coffview Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::coff::{FileHeader, SectionHeader};
use crate::common::*;
use crate::strings::{parse_name, StringTable};
use crate::symbols::SymbolStream;
use crate::symtab::CoffSymbolIter;
use crate::types::TypeStream;

/// Size of one COFF symbol table record in bytes.
const SYMBOL_RECORD_SIZE: usize = 18;

/// The linker directive section.
const SECTION_DIRECTIVE: &[u8] = b".drectve";
/// The per-source-file checksum blob some toolchains emit. Its layout is
/// undocumented; it is exposed as raw bytes only.
const SECTION_CHECKSUMS: &[u8] = b".chks64";
/// The CodeView symbol stream.
const SECTION_DEBUG_SYMBOLS: &[u8] = b".debug$S";
/// The CodeView type stream.
const SECTION_DEBUG_TYPES: &[u8] = b".debug$T";

/// What a section contains, judged by its resolved name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SectionClass {
    /// `.drectve`: ASCII linker directives.
    Directive,
    /// `.chks64`: an opaque checksum blob.
    ChecksumBlob,
    /// `.debug$S`: a CodeView symbol stream.
    DebugSymbols,
    /// `.debug$T`: a CodeView type stream.
    DebugTypes,
    /// Anything else; code, data, relocatable payloads.
    Other,
}

/// A COFF object file, decoded lazily from a byte buffer.
///
/// `ObjectFile::parse` reads and validates the headers up front; everything
/// else is a read-only view into the buffer, produced on demand. The buffer
/// must outlive the `ObjectFile` and every value derived from it.
///
/// ```no_run
/// # fn load() -> &'static [u8] { unimplemented!() }
/// # fn run() -> coffview::Result<()> {
/// use coffview::{FallibleIterator, ObjectFile, SectionClass};
///
/// let data = load();
/// let object = ObjectFile::parse(data)?;
/// for section in object.sections() {
///     if object.section_class(section)? == SectionClass::DebugTypes {
///         let mut types = object.type_stream(section)?.iter();
///         while let Some(ty) = types.next()? {
///             println!("{:?}", ty.parse()?);
///         }
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ObjectFile<'o> {
    data: &'o [u8],
    header: FileHeader,
    sections: Vec<SectionHeader>,
    symbol_table: &'o [u8],
    string_table: StringTable<'o>,
}

impl<'o> ObjectFile<'o> {
    /// Decodes the file and section headers and locates the symbol and string
    /// tables.
    ///
    /// Every header-derived offset and length is validated against the buffer
    /// here, so later section accesses cannot run out of bounds.
    pub fn parse(data: &'o [u8]) -> Result<Self> {
        let mut buf = ParseBuffer::from(data);
        let header = FileHeader::parse(&mut buf)?;

        let (symbol_table, string_table) = if header.pointer_to_symbol_table == 0 {
            (&[][..], StringTable::empty())
        } else {
            let start = header.pointer_to_symbol_table as usize;
            let size = header.number_of_symbols as usize * SYMBOL_RECORD_SIZE;
            let end = match start.checked_add(size) {
                Some(end) if end <= data.len() => end,
                _ => {
                    return Err(Error::MalformedHeader(
                        "symbol table runs past the end of the file",
                    ))
                }
            };

            (&data[start..end], StringTable::parse(data, end)?)
        };

        buf.skip(header.size_of_optional_header as usize)?;

        let mut sections = Vec::with_capacity(header.number_of_sections as usize);
        for _ in 0..header.number_of_sections {
            let section = SectionHeader::parse(&mut buf)?;

            // Sections of uninitialized data have no stored bytes; for all
            // others the stored range must lie within the file.
            let start = section.pointer_to_raw_data as u64;
            let size = section.size_of_raw_data as u64;
            if start != 0 && start + size > data.len() as u64 {
                return Err(Error::MalformedHeader(
                    "section data runs past the end of the file",
                ));
            }

            sections.push(section);
        }

        Ok(ObjectFile {
            data,
            header,
            sections,
            symbol_table,
            string_table,
        })
    }

    /// The COFF file header.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// The section headers, in file order.
    pub fn sections(&self) -> &[SectionHeader] {
        &self.sections
    }

    /// The string table holding long section and symbol names.
    pub fn string_table(&self) -> &StringTable<'o> {
        &self.string_table
    }

    /// Returns an iterator over the COFF symbol table.
    ///
    /// The iterator is empty for files without a symbol table.
    pub fn coff_symbols(&self) -> CoffSymbolIter<'o> {
        CoffSymbolIter::new(ParseBuffer::with_offset(
            self.symbol_table,
            self.header.pointer_to_symbol_table as usize,
        ))
    }

    /// Resolves a section's name, following the `/offset` indirection for
    /// names longer than eight bytes.
    pub fn section_name<'s>(&'s self, section: &'s SectionHeader) -> Result<RawString<'s>> {
        parse_name(&section.name, &self.string_table)
    }

    /// Returns the stored bytes of a section.
    ///
    /// Sections holding only uninitialized data return an empty slice.
    pub fn section_data(&self, section: &SectionHeader) -> &'o [u8] {
        let start = section.pointer_to_raw_data as usize;
        if start == 0 {
            return &[];
        }
        &self.data[start..start + section.size_of_raw_data as usize]
    }

    /// Judges what a section contains from its resolved name.
    pub fn section_class(&self, section: &SectionHeader) -> Result<SectionClass> {
        let name = self.section_name(section)?;
        Ok(match name.as_bytes() {
            SECTION_DIRECTIVE => SectionClass::Directive,
            SECTION_CHECKSUMS => SectionClass::ChecksumBlob,
            SECTION_DEBUG_SYMBOLS => SectionClass::DebugSymbols,
            SECTION_DEBUG_TYPES => SectionClass::DebugTypes,
            _ => SectionClass::Other,
        })
    }

    /// Returns the linker directives of a `.drectve` section as raw text.
    pub fn directive(&self, section: &SectionHeader) -> RawString<'o> {
        RawString::from(self.section_data(section))
    }

    /// Decodes a `.debug$S` section into a [`SymbolStream`].
    pub fn symbol_stream(&self, section: &SectionHeader) -> Result<SymbolStream<'o>> {
        SymbolStream::parse(
            self.section_data(section),
            section.pointer_to_raw_data as usize,
        )
    }

    /// Decodes a `.debug$T` section into a [`TypeStream`].
    pub fn type_stream(&self, section: &SectionHeader) -> Result<TypeStream<'o>> {
        TypeStream::parse(
            self.section_data(section),
            section.pointer_to_raw_data as usize,
        )
    }
}
