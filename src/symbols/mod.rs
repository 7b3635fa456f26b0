// Copyright 2025 coffview Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The CodeView symbol stream stored in `.debug$S` sections.
//!
//! The stream opens with a signature word and then holds a sequence of
//! 4-aligned subsections. Three subsection kinds carry decodable content:
//! symbol records, a string table of file names, and per-file checksums.
//! Everything else is passed through as raw bytes.

use std::fmt;

use scroll::{Pread, LE};

use crate::common::*;
use crate::FallibleIterator;

mod constants;

pub use self::constants::*;

/// The raw type discriminator for symbol records.
pub type SymbolKind = u16;

/// A `.debug$S` stream whose signature has been verified.
///
/// The signature check is fatal on mismatch: symbol record layouts changed
/// between CodeView eras, so decoding an unknown era would produce garbage.
#[derive(Debug)]
pub struct SymbolStream<'t> {
    data: &'t [u8],
    base: usize,
}

impl<'t> SymbolStream<'t> {
    pub(crate) fn parse(data: &'t [u8], base: usize) -> Result<Self> {
        let mut buf = ParseBuffer::with_offset(data, base);
        let signature = buf.parse_u32()?;
        if signature != CV_SIGNATURE_C13 {
            return Err(Error::UnsupportedSignature {
                expected: CV_SIGNATURE_C13,
                actual: signature,
            });
        }

        Ok(SymbolStream {
            data: &data[4..],
            base: base + 4,
        })
    }

    /// Returns an iterator over the subsections of this stream.
    pub fn subsections(&self) -> SubsectionIter<'t> {
        SubsectionIter {
            buf: ParseBuffer::with_offset(self.data, self.base),
        }
    }
}

/// One subsection of a [`SymbolStream`], dispatched on its type code.
#[derive(Debug)]
pub enum Subsection<'t> {
    /// A `DEBUG_S_SYMBOLS` subsection of CodeView symbol records.
    Symbols(SymbolIter<'t>),
    /// A `DEBUG_S_STRINGTABLE` subsection of NUL-terminated file names.
    StringTable(StringTableEntryIter<'t>),
    /// A `DEBUG_S_FILECHKSMS` subsection of source file checksums.
    FileChecksums(ChecksumIter<'t>),
    /// Any other subsection, with its payload untouched.
    Unknown { kind: u32, data: &'t [u8] },
}

/// A source of [`Subsection`]s from a symbol stream.
#[derive(Debug)]
pub struct SubsectionIter<'t> {
    buf: ParseBuffer<'t>,
}

impl<'t> FallibleIterator for SubsectionIter<'t> {
    type Item = Subsection<'t>;
    type Error = Error;

    fn next(&mut self) -> Result<Option<Self::Item>> {
        self.buf.align(4);
        if self.buf.is_empty() {
            return Ok(None);
        }

        let offset = self.buf.offset();
        let kind = self.buf.parse_u32()?;
        let mut length = self.buf.parse_u32()? as usize;
        if length == 0 {
            // a zero count means "everything up to the end of the stream"
            length = self.buf.len();
        }
        if length > self.buf.len() {
            return Err(Error::TruncatedSubsection(offset));
        }

        let base = self.buf.offset();
        let data = self.buf.take(length)?;

        Ok(Some(match kind {
            DEBUG_S_SYMBOLS => Subsection::Symbols(SymbolIter {
                buf: ParseBuffer::with_offset(data, base),
            }),
            DEBUG_S_STRINGTABLE => Subsection::StringTable(StringTableEntryIter {
                buf: ParseBuffer::with_offset(data, base),
                index: 0,
            }),
            DEBUG_S_FILECHKSMS => Subsection::FileChecksums(ChecksumIter {
                buf: ParseBuffer::with_offset(data, base),
                file_id: 0,
            }),
            _ => Subsection::Unknown { kind, data },
        }))
    }
}

/// Represents one CodeView symbol record.
///
/// A `Symbol` is represented internally as a `&[u8]`, and in general the bytes
/// inside are not inspected in any way before calling any of the accessor
/// methods. Use [`parse`](Self::parse) to decode it into [`SymbolData`].
#[derive(Copy, Clone, PartialEq)]
pub struct Symbol<'t> {
    data: &'t [u8],
    offset: usize,
}

impl<'t> Symbol<'t> {
    /// Returns the raw kind code of this symbol record.
    #[inline]
    pub fn raw_kind(&self) -> SymbolKind {
        debug_assert!(self.data.len() >= 2);
        self.data.pread_with(0, LE).unwrap_or_default()
    }

    /// Returns the raw bytes of this symbol record, including the kind code
    /// but not the preceding length field.
    #[inline]
    pub fn raw_bytes(&self) -> &'t [u8] {
        self.data
    }

    /// Parse the symbol into the `SymbolData` it contains.
    ///
    /// Errors report the absolute position of the offending byte within the
    /// file, not a record-relative one.
    #[inline]
    pub fn parse(&self) -> Result<SymbolData<'t>> {
        let mut buf = ParseBuffer::with_offset(self.data, self.offset);
        parse_symbol_data(&mut buf)
    }
}

impl<'t> fmt::Debug for Symbol<'t> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Symbol{{ kind: {:#x} [{} bytes] }}",
            self.raw_kind(),
            self.data.len()
        )
    }
}

/// A source of [`Symbol`]s from a symbols subsection.
#[derive(Debug)]
pub struct SymbolIter<'t> {
    buf: ParseBuffer<'t>,
}

impl<'t> FallibleIterator for SymbolIter<'t> {
    type Item = Symbol<'t>;
    type Error = Error;

    fn next(&mut self) -> Result<Option<Self::Item>> {
        if self.buf.is_empty() {
            return Ok(None);
        }

        let offset = self.buf.offset();

        // The length counts the kind code but not the length field itself.
        let length = self.buf.parse_u16()? as usize;
        if length < 2 {
            return Err(Error::SymbolTooShort(offset));
        }

        let base = self.buf.offset();
        let data = self.buf.take(length)?;
        Ok(Some(Symbol { data, offset: base }))
    }
}

/// Encapsulates the variable part of a decoded symbol record.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolData<'t> {
    /// Path to the object file, kind `S_OBJNAME`.
    ObjName(ObjNameSymbol<'t>),
    /// Flags used to compile the module, kind `S_COMPILE3`.
    CompileFlags(CompileFlagsSymbol<'t>),
    /// A using namespace directive, kind `S_UNAMESPACE`.
    UsingNamespace(UsingNamespaceSymbol<'t>),
    /// Reference to build information, kind `S_BUILDINFO`.
    BuildInfo(BuildInfoSymbol),
    /// A record of a kind this crate does not recognize.
    ///
    /// Newer compilers emit kinds freely; an unrecognized kind is carried
    /// through with its raw payload instead of failing the decode.
    Unknown { kind: SymbolKind, data: &'t [u8] },
}

/// Parse one symbol record body out of a `ParseBuffer`.
pub(crate) fn parse_symbol_data<'t>(buf: &mut ParseBuffer<'t>) -> Result<SymbolData<'t>> {
    let kind = buf.parse_u16()?;

    match kind {
        S_OBJNAME => Ok(SymbolData::ObjName(ObjNameSymbol {
            signature: buf.parse_u32()?,
            name: buf.parse_cstring()?,
        })),

        S_COMPILE3 => Ok(SymbolData::CompileFlags(CompileFlagsSymbol {
            language: buf.parse_u8()?,
            flags: parse_compile_flags(buf)?,
            machine: buf.parse_u16()?,
            frontend_version: parse_compiler_version(buf)?,
            backend_version: parse_compiler_version(buf)?,
            version_string: buf.parse_cstring()?,
        })),

        S_UNAMESPACE => Ok(SymbolData::UsingNamespace(UsingNamespaceSymbol {
            name: buf.parse_cstring()?,
        })),

        S_BUILDINFO => Ok(SymbolData::BuildInfo(BuildInfoSymbol {
            id: buf.parse_u32()?,
        })),

        _ => {
            let data = buf.take(buf.len())?;
            Ok(SymbolData::Unknown { kind, data })
        }
    }
}

/// Name of the object file of this module.
///
/// Symbol kind `S_OBJNAME`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ObjNameSymbol<'t> {
    /// Signature.
    pub signature: u32,
    /// Path to the object file.
    pub name: RawString<'t>,
}

/// A using namespace directive.
///
/// Symbol kind `S_UNAMESPACE`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UsingNamespaceSymbol<'t> {
    /// The name of the imported namespace.
    pub name: RawString<'t>,
}

/// Reference to build information.
///
/// Symbol kind `S_BUILDINFO`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BuildInfoSymbol {
    /// Index of the build information record in the id stream.
    pub id: IdIndex,
}

/// A version number referred to by `CompileFlagsSymbol`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CompilerVersion {
    /// The major version number.
    pub major: u16,
    /// The minor version number.
    pub minor: u16,
    /// The build (patch) version number.
    pub build: u16,
    /// The QFE (quick fix engineering) number.
    pub qfe: u16,
}

fn parse_compiler_version(buf: &mut ParseBuffer<'_>) -> Result<CompilerVersion> {
    Ok(CompilerVersion {
        major: buf.parse_u16()?,
        minor: buf.parse_u16()?,
        build: buf.parse_u16()?,
        qfe: buf.parse_u16()?,
    })
}

/// Compile flags declared in `CompileFlagsSymbol`.
///
/// The on-disk form is a 3-byte bitfield; the bits are unpacked into named
/// booleans here so that no bit-ordering assumptions leak out.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CompileFlags {
    /// Compiled for edit and continue.
    pub edit_and_continue: bool,
    /// Compiled without debugging info.
    pub no_debug_info: bool,
    /// Compiled with `LTCG`.
    pub link_time_codegen: bool,
    /// Compiled with `/bzalign`.
    pub no_data_align: bool,
    /// Managed code or data is present.
    pub managed: bool,
    /// Compiled with `/GS`.
    pub security_checks: bool,
    /// Compiled with `/hotpatch`.
    pub hot_patch: bool,
    /// Compiled with `CvtCIL`.
    pub cvtcil: bool,
    /// This is a MSIL .NET Module.
    pub msil_module: bool,
    /// Compiled with `/sdl`.
    pub sdl: bool,
    /// Compiled with `/ltcg:pgo` or `pgo:`.
    pub pgo: bool,
    /// This is a .exp module.
    pub exp_module: bool,
}

fn parse_compile_flags(buf: &mut ParseBuffer<'_>) -> Result<CompileFlags> {
    let raw = buf.parse_u16()?;
    buf.parse_u8()?; // unused third byte

    Ok(CompileFlags {
        edit_and_continue: raw & 1 != 0,
        no_debug_info: (raw >> 1) & 1 != 0,
        link_time_codegen: (raw >> 2) & 1 != 0,
        no_data_align: (raw >> 3) & 1 != 0,
        managed: (raw >> 4) & 1 != 0,
        security_checks: (raw >> 5) & 1 != 0,
        hot_patch: (raw >> 6) & 1 != 0,
        cvtcil: (raw >> 7) & 1 != 0,
        msil_module: (raw >> 8) & 1 != 0,
        sdl: (raw >> 9) & 1 != 0,
        pgo: (raw >> 10) & 1 != 0,
        exp_module: (raw >> 11) & 1 != 0,
    })
}

/// Flags used to compile a module.
///
/// Symbol kind `S_COMPILE3`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CompileFlagsSymbol<'t> {
    /// The source language, a `CV_CFL_LANG` code.
    pub language: u8,
    /// Compiler flags.
    pub flags: CompileFlags,
    /// Machine type of the compilation target, a `CV_CPU_TYPE` code.
    pub machine: u16,
    /// Version of the compiler frontend.
    pub frontend_version: CompilerVersion,
    /// Version of the compiler backend.
    pub backend_version: CompilerVersion,
    /// Display name of the compiler.
    pub version_string: RawString<'t>,
}

/// A string table entry from a `DEBUG_S_STRINGTABLE` subsection, paired with
/// its zero-based position.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StringTableEntry<'t> {
    /// Sequential index of this entry within the subsection.
    pub index: u32,
    /// The string value.
    pub value: RawString<'t>,
}

/// A source of [`StringTableEntry`]s from a string table subsection.
#[derive(Debug)]
pub struct StringTableEntryIter<'t> {
    buf: ParseBuffer<'t>,
    index: u32,
}

impl<'t> FallibleIterator for StringTableEntryIter<'t> {
    type Item = StringTableEntry<'t>;
    type Error = Error;

    fn next(&mut self) -> Result<Option<Self::Item>> {
        if self.buf.is_empty() {
            return Ok(None);
        }

        let value = self.buf.parse_cstring()?;
        let index = self.index;
        self.index += 1;

        Ok(Some(StringTableEntry { index, value }))
    }
}

/// Checksum of a source file's content.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileChecksum<'t> {
    None,
    Md5(&'t [u8]),
    Sha1(&'t [u8]),
    Sha256(&'t [u8]),
    /// A checksum kind this crate does not recognize.
    Unknown { kind: u8, data: &'t [u8] },
}

const CHKSUM_TYPE_NONE: u8 = 0;
const CHKSUM_TYPE_MD5: u8 = 1;
const CHKSUM_TYPE_SHA1: u8 = 2;
const CHKSUM_TYPE_SHA256: u8 = 3;

/// A source file entry from a `DEBUG_S_FILECHKSMS` subsection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FileChecksumEntry<'t> {
    /// Sequential id of this file, counted in encounter order.
    ///
    /// Other subsections refer to files by an index whose exact derivation is
    /// not documented; encounter order is reproducible and matches what
    /// compilers emit in practice.
    pub file_id: u32,
    /// Reference to the file name in the stream's string table subsection.
    pub name: StringRef,
    /// Checksum of the file contents.
    pub checksum: FileChecksum<'t>,
}

/// A source of [`FileChecksumEntry`]s from a file checksums subsection.
#[derive(Debug)]
pub struct ChecksumIter<'t> {
    buf: ParseBuffer<'t>,
    file_id: u32,
}

impl<'t> FallibleIterator for ChecksumIter<'t> {
    type Item = FileChecksumEntry<'t>;
    type Error = Error;

    fn next(&mut self) -> Result<Option<Self::Item>> {
        if self.buf.is_empty() {
            return Ok(None);
        }

        let name = StringRef(self.buf.parse_u32()?);
        let length = self.buf.parse_u8()? as usize;
        let kind = self.buf.parse_u8()?;
        let data = self.buf.take(length)?;

        let checksum = match kind {
            CHKSUM_TYPE_NONE => FileChecksum::None,
            CHKSUM_TYPE_MD5 => FileChecksum::Md5(data),
            CHKSUM_TYPE_SHA1 => FileChecksum::Sha1(data),
            CHKSUM_TYPE_SHA256 => FileChecksum::Sha256(data),
            _ => FileChecksum::Unknown { kind, data },
        };

        // entries are padded out to a multiple of 4 bytes
        self.buf.align(4);

        let file_id = self.file_id;
        self.file_id += 1;

        Ok(Some(FileChecksumEntry {
            file_id,
            name,
            checksum,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol_record(kind: u16, payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&((payload.len() + 2) as u16).to_le_bytes());
        bytes.extend_from_slice(&kind.to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    fn subsection(kind: u32, payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&kind.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(payload);
        while bytes.len() % 4 != 0 {
            bytes.push(0);
        }
        bytes
    }

    fn stream(subsections: &[Vec<u8>]) -> Vec<u8> {
        let mut bytes = CV_SIGNATURE_C13.to_le_bytes().to_vec();
        for sub in subsections {
            bytes.extend_from_slice(sub);
        }
        bytes
    }

    #[test]
    fn test_bad_signature() {
        let data = 1u32.to_le_bytes();
        match SymbolStream::parse(&data, 0) {
            Err(Error::UnsupportedSignature {
                expected: 4,
                actual: 1,
            }) => (),
            other => panic!("expected signature error, got {:?}", other),
        }
    }

    #[test]
    fn test_obj_name() {
        let mut payload = 0u32.to_le_bytes().to_vec();
        payload.extend_from_slice(b"hello.obj\0");
        let record = symbol_record(S_OBJNAME, &payload);
        let data = stream(&[subsection(DEBUG_S_SYMBOLS, &record)]);

        let stream = SymbolStream::parse(&data, 0).expect("parse");
        let mut subsections = stream.subsections();

        let mut symbols = match subsections.next().expect("next") {
            Some(Subsection::Symbols(iter)) => iter,
            other => panic!("expected symbols subsection, got {:?}", other),
        };

        let symbol = symbols.next().expect("next").expect("symbol");
        assert_eq!(symbol.raw_kind(), S_OBJNAME);
        assert_eq!(
            symbol.parse().expect("parse"),
            SymbolData::ObjName(ObjNameSymbol {
                signature: 0,
                name: RawString::from("hello.obj"),
            })
        );

        assert!(symbols.next().expect("next").is_none());
        assert!(subsections.next().expect("next").is_none());
    }

    fn single_symbol_stream(record: &[u8]) -> Vec<u8> {
        stream(&[subsection(DEBUG_S_SYMBOLS, record)])
    }

    fn first_symbol(data: &[u8]) -> SymbolData<'_> {
        let stream = SymbolStream::parse(data, 0).expect("parse");
        let mut subsections = stream.subsections();
        let mut symbols = match subsections.next().expect("next") {
            Some(Subsection::Symbols(iter)) => iter,
            other => panic!("expected symbols subsection, got {:?}", other),
        };
        let symbol = symbols.next().expect("next").expect("symbol");
        symbol.parse().expect("parse")
    }

    #[test]
    fn test_compile_flags() {
        let payload = &[
            0x00, // language: C
            0x80, 0x00, 0x00, // flags: cvtcil
            0xd0, 0x00, // machine: x64
            0x13, 0x00, 0x0d, 0x00, 0x81, 0x75, 0x00, 0x00, // frontend 19.13.30081.0
            0x13, 0x00, 0x0d, 0x00, 0x81, 0x75, 0x00, 0x00, // backend
            b'M', b'S', b'V', b'C', 0x00,
        ];
        let data = single_symbol_stream(&symbol_record(S_COMPILE3, payload));

        let symbol = match first_symbol(&data) {
            SymbolData::CompileFlags(symbol) => symbol,
            other => panic!("expected compile flags, got {:?}", other),
        };
        assert_eq!(symbol.language, 0);
        assert_eq!(symbol.machine, 0xd0);
        assert!(symbol.flags.cvtcil);
        assert!(!symbol.flags.sdl);
        assert_eq!(
            symbol.frontend_version,
            CompilerVersion {
                major: 0x13,
                minor: 0x0d,
                build: 0x7581,
                qfe: 0,
            }
        );
        assert_eq!(symbol.version_string, RawString::from("MSVC"));
    }

    #[test]
    fn test_using_namespace() {
        let data = single_symbol_stream(&symbol_record(S_UNAMESPACE, b"std\0"));
        assert_eq!(
            first_symbol(&data),
            SymbolData::UsingNamespace(UsingNamespaceSymbol {
                name: RawString::from("std"),
            })
        );
    }

    #[test]
    fn test_build_info() {
        let data = single_symbol_stream(&symbol_record(S_BUILDINFO, &0x1005u32.to_le_bytes()));
        assert_eq!(
            first_symbol(&data),
            SymbolData::BuildInfo(BuildInfoSymbol { id: 0x1005 })
        );
    }

    #[test]
    fn test_record_error_offsets_are_absolute() {
        // an obj name whose string never terminates; the name begins 20 bytes
        // into the stream (4 signature, 8 subsection header, 4 length + kind,
        // 4 obj signature)
        let record = symbol_record(S_OBJNAME, &[0, 0, 0, 0, b'a', b'b']);
        let data = single_symbol_stream(&record);

        let stream = SymbolStream::parse(&data, 0).expect("parse");
        let mut subsections = stream.subsections();
        let mut symbols = match subsections.next().expect("next") {
            Some(Subsection::Symbols(iter)) => iter,
            other => panic!("expected symbols subsection, got {:?}", other),
        };

        let symbol = symbols.next().expect("next").expect("symbol");
        match symbol.parse() {
            Err(Error::UnterminatedString(20)) => (),
            other => panic!("expected unterminated string at 20, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_symbol_kind() {
        let record = symbol_record(0x1199, &[0xde, 0xad, 0xbe, 0xef]);
        let data = stream(&[subsection(DEBUG_S_SYMBOLS, &record)]);

        let stream = SymbolStream::parse(&data, 0).expect("parse");
        let mut subsections = stream.subsections();
        let mut symbols = match subsections.next().expect("next") {
            Some(Subsection::Symbols(iter)) => iter,
            other => panic!("expected symbols subsection, got {:?}", other),
        };

        let symbol = symbols.next().expect("next").expect("symbol");
        assert_eq!(
            symbol.parse().expect("parse"),
            SymbolData::Unknown {
                kind: 0x1199,
                data: &[0xde, 0xad, 0xbe, 0xef],
            }
        );

        // the declared length carries the walk past the unknown record
        assert!(symbols.next().expect("next").is_none());
    }

    #[test]
    fn test_string_table_indices() {
        let data = stream(&[subsection(DEBUG_S_STRINGTABLE, b"a.c\0b.h\0")]);

        let stream = SymbolStream::parse(&data, 0).expect("parse");
        let mut subsections = stream.subsections();
        let strings = match subsections.next().expect("next") {
            Some(Subsection::StringTable(iter)) => iter,
            other => panic!("expected string table, got {:?}", other),
        };

        let entries: Vec<_> = strings.collect().expect("collect");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 0);
        assert_eq!(entries[0].value, RawString::from("a.c"));
        assert_eq!(entries[1].index, 1);
        assert_eq!(entries[1].value, RawString::from("b.h"));
    }

    #[test]
    fn test_sha256_checksum_alignment() {
        let mut payload = Vec::new();
        // entry 0: SHA-256, 32 bytes; header + payload is 38 bytes, padded to 40
        payload.extend_from_slice(&8u32.to_le_bytes());
        payload.push(32);
        payload.push(CHKSUM_TYPE_SHA256);
        payload.extend_from_slice(&[0xCC; 32]);
        payload.extend_from_slice(&[0, 0]);
        // entry 1: no checksum
        payload.extend_from_slice(&16u32.to_le_bytes());
        payload.push(0);
        payload.push(CHKSUM_TYPE_NONE);
        payload.extend_from_slice(&[0, 0]);

        let data = stream(&[subsection(DEBUG_S_FILECHKSMS, &payload)]);

        let stream = SymbolStream::parse(&data, 0).expect("parse");
        let mut subsections = stream.subsections();
        let checksums = match subsections.next().expect("next") {
            Some(Subsection::FileChecksums(iter)) => iter,
            other => panic!("expected checksums, got {:?}", other),
        };

        let entries: Vec<_> = checksums.collect().expect("collect");
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].file_id, 0);
        assert_eq!(entries[0].name, StringRef(8));
        assert_eq!(entries[0].checksum, FileChecksum::Sha256(&[0xCC; 32]));

        assert_eq!(entries[1].file_id, 1);
        assert_eq!(entries[1].name, StringRef(16));
        assert_eq!(entries[1].checksum, FileChecksum::None);
    }

    #[test]
    fn test_unknown_checksum_kind() {
        let mut payload = Vec::new();
        // entry 0: an unrecognized checksum kind with a 2-byte payload
        payload.extend_from_slice(&8u32.to_le_bytes());
        payload.push(2);
        payload.push(7);
        payload.extend_from_slice(&[0xAB, 0xCD]);
        // entry 1: MD5, proving the walk continues past the unknown entry
        payload.extend_from_slice(&16u32.to_le_bytes());
        payload.push(16);
        payload.push(CHKSUM_TYPE_MD5);
        payload.extend_from_slice(&[0x11; 16]);
        payload.extend_from_slice(&[0, 0]);

        let data = stream(&[subsection(DEBUG_S_FILECHKSMS, &payload)]);

        let stream = SymbolStream::parse(&data, 0).expect("parse");
        let mut subsections = stream.subsections();
        let checksums = match subsections.next().expect("next") {
            Some(Subsection::FileChecksums(iter)) => iter,
            other => panic!("expected checksums, got {:?}", other),
        };

        let entries: Vec<_> = checksums.collect().expect("collect");
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].file_id, 0);
        assert_eq!(
            entries[0].checksum,
            FileChecksum::Unknown {
                kind: 7,
                data: &[0xAB, 0xCD],
            }
        );

        assert_eq!(entries[1].file_id, 1);
        assert_eq!(entries[1].checksum, FileChecksum::Md5(&[0x11; 16]));
    }

    #[test]
    fn test_truncated_subsection() {
        let mut data = CV_SIGNATURE_C13.to_le_bytes().to_vec();
        data.extend_from_slice(&DEBUG_S_SYMBOLS.to_le_bytes());
        data.extend_from_slice(&100u32.to_le_bytes()); // only 4 bytes follow
        data.extend_from_slice(&[0; 4]);

        let stream = SymbolStream::parse(&data, 0).expect("parse");
        match stream.subsections().next() {
            Err(Error::TruncatedSubsection(4)) => (),
            other => panic!("expected truncated subsection, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_length_subsection_takes_rest() {
        let mut data = CV_SIGNATURE_C13.to_le_bytes().to_vec();
        data.extend_from_slice(&0xf6u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&[0xAB; 6]);

        let stream = SymbolStream::parse(&data, 0).expect("parse");
        let mut subsections = stream.subsections();
        match subsections.next().expect("next") {
            Some(Subsection::Unknown { kind: 0xf6, data }) => assert_eq!(data, &[0xAB; 6]),
            other => panic!("expected unknown subsection, got {:?}", other),
        }
        assert!(subsections.next().expect("next").is_none());
    }
}
