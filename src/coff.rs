// Copyright 2025 coffview Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Definitions for the fixed-layout COFF headers at the front of an object file.

use std::fmt;

use scroll::ctx::TryFromCtx;
use scroll::Endian;

use crate::common::*;

/// Machine code for x86 objects.
pub const IMAGE_FILE_MACHINE_I386: u16 = 0x014c;
/// Machine code for x86-64 objects.
pub const IMAGE_FILE_MACHINE_AMD64: u16 = 0x8664;
/// Machine code for AArch64 objects.
pub const IMAGE_FILE_MACHINE_ARM64: u16 = 0xaa64;

/// The section contains executable code.
const IMAGE_SCN_CNT_CODE: u32 = 0x0000_0020;
/// The section contains initialized data.
const IMAGE_SCN_CNT_INITIALIZED_DATA: u32 = 0x0000_0040;
/// The section contains uninitialized data.
const IMAGE_SCN_CNT_UNINITIALIZED_DATA: u32 = 0x0000_0080;
/// The section contains comments or other information. This is valid only for object files.
const IMAGE_SCN_LNK_INFO: u32 = 0x0000_0200;
/// The section will not become part of the image. This is valid only for object files.
const IMAGE_SCN_LNK_REMOVE: u32 = 0x0000_0800;
/// The section contains COMDAT data. This is valid only for object files.
const IMAGE_SCN_LNK_COMDAT: u32 = 0x0000_1000;
/// The section contains extended relocations. If set and `number_of_relocations`
/// is `0xffff`, the actual count is stored in the `virtual_address` field of the
/// first relocation.
const IMAGE_SCN_LNK_NRELOC_OVFL: u32 = 0x0100_0000;
/// The section can be discarded as needed.
const IMAGE_SCN_MEM_DISCARDABLE: u32 = 0x0200_0000;
/// The section can be executed as code.
const IMAGE_SCN_MEM_EXECUTE: u32 = 0x2000_0000;
/// The section can be read.
const IMAGE_SCN_MEM_READ: u32 = 0x4000_0000;
/// The section can be written to.
const IMAGE_SCN_MEM_WRITE: u32 = 0x8000_0000;

/// Mask covering the `IMAGE_SCN_ALIGN_*` values.
const IMAGE_SCN_ALIGN_MASK: u32 = 0x00f0_0000;

/// Characteristic flags of a [`SectionHeader`].
///
/// These are defined by Microsoft as [`IMAGE_SCN_`] constants.
///
/// [`IMAGE_SCN_`]: https://docs.microsoft.com/en-us/windows/win32/api/winnt/ns-winnt-image_section_header
#[derive(Clone, Copy, Eq, Default, PartialEq)]
pub struct SectionCharacteristics(pub u32);

impl SectionCharacteristics {
    /// The section contains executable code.
    pub fn code(self) -> bool {
        (self.0 & IMAGE_SCN_CNT_CODE) > 0
    }

    /// The section contains initialized data.
    pub fn initialized_data(self) -> bool {
        (self.0 & IMAGE_SCN_CNT_INITIALIZED_DATA) > 0
    }

    /// The section contains uninitialized data.
    pub fn uninitialized_data(self) -> bool {
        (self.0 & IMAGE_SCN_CNT_UNINITIALIZED_DATA) > 0
    }

    /// The section contains comments or other information, such as linker
    /// directives. This is valid only for object files.
    pub fn info(self) -> bool {
        (self.0 & IMAGE_SCN_LNK_INFO) > 0
    }

    /// The section will not become part of the image. This is valid only for object files.
    pub fn remove(self) -> bool {
        (self.0 & IMAGE_SCN_LNK_REMOVE) > 0
    }

    /// The section contains COMDAT data. This is valid only for object files.
    pub fn comdat(self) -> bool {
        (self.0 & IMAGE_SCN_LNK_COMDAT) > 0
    }

    /// Alignment for section data.
    ///
    /// This is valid only for object files. Returns `Some` if an alignment is
    /// specified, and `None` if not. `Some(1)` means that the section should
    /// not be padded to a boundary.
    pub fn alignment(self) -> Option<u32> {
        match (self.0 & IMAGE_SCN_ALIGN_MASK) >> 20 {
            0 => None,
            value => Some(1 << (value - 1)),
        }
    }

    /// The section contains extended relocations.
    pub fn lnk_nreloc_ovfl(self) -> bool {
        (self.0 & IMAGE_SCN_LNK_NRELOC_OVFL) > 0
    }

    /// The section can be discarded as needed.
    pub fn discardable(self) -> bool {
        (self.0 & IMAGE_SCN_MEM_DISCARDABLE) > 0
    }

    /// The section can be executed as code.
    pub fn execute(self) -> bool {
        (self.0 & IMAGE_SCN_MEM_EXECUTE) > 0
    }

    /// The section can be read.
    pub fn read(self) -> bool {
        (self.0 & IMAGE_SCN_MEM_READ) > 0
    }

    /// The section can be written to.
    pub fn write(self) -> bool {
        (self.0 & IMAGE_SCN_MEM_WRITE) > 0
    }
}

impl fmt::Debug for SectionCharacteristics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("SectionCharacteristics")
                .field("code", &self.code())
                .field("initialized_data", &self.initialized_data())
                .field("uninitialized_data", &self.uninitialized_data())
                .field("info", &self.info())
                .field("remove", &self.remove())
                .field("comdat", &self.comdat())
                .field("alignment", &self.alignment())
                .field("lnk_nreloc_ovfl", &self.lnk_nreloc_ovfl())
                .field("discardable", &self.discardable())
                .field("execute", &self.execute())
                .field("read", &self.read())
                .field("write", &self.write())
                .finish()
        } else {
            f.debug_tuple("SectionCharacteristics")
                .field(&format_args!("{:#x}", self.0))
                .finish()
        }
    }
}

impl<'t> TryFromCtx<'t, Endian> for SectionCharacteristics {
    type Error = scroll::Error;

    fn try_from_ctx(this: &'t [u8], le: Endian) -> scroll::Result<(Self, usize)> {
        let (value, size) = u32::try_from_ctx(this, le)?;
        Ok((SectionCharacteristics(value), size))
    }
}

/// The COFF file header at offset zero of every object file.
///
/// This is Microsoft's `IMAGE_FILE_HEADER`, 20 bytes of fixed layout that
/// locate everything else in the file.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct FileHeader {
    /// Identifies the target machine, such as [`IMAGE_FILE_MACHINE_AMD64`].
    pub machine: u16,

    /// The number of section headers immediately following this header.
    pub number_of_sections: u16,

    /// Seconds since the Unix epoch at which the file was produced.
    pub timestamp: u32,

    /// File offset of the symbol table, or zero if there is none.
    ///
    /// The string table starts immediately after the last symbol record.
    pub pointer_to_symbol_table: u32,

    /// The number of records in the symbol table, auxiliary records included.
    pub number_of_symbols: u32,

    /// Size of the optional header between the section headers and this one.
    /// Should be zero for object files.
    pub size_of_optional_header: u16,

    /// File-level attribute flags.
    pub characteristics: u16,
}

impl FileHeader {
    pub(crate) fn parse(buf: &mut ParseBuffer<'_>) -> Result<Self> {
        Ok(Self {
            machine: buf.parse_u16()?,
            number_of_sections: buf.parse_u16()?,
            timestamp: buf.parse_u32()?,
            pointer_to_symbol_table: buf.parse_u32()?,
            number_of_symbols: buf.parse_u32()?,
            size_of_optional_header: buf.parse_u16()?,
            characteristics: buf.parse_u16()?,
        })
    }
}

impl fmt::Debug for FileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHeader")
            .field("machine", &format_args!("{:#x}", self.machine))
            .field("number_of_sections", &self.number_of_sections)
            .field("timestamp", &self.timestamp)
            .field(
                "pointer_to_symbol_table",
                &format_args!("{:#x}", self.pointer_to_symbol_table),
            )
            .field("number_of_symbols", &self.number_of_symbols)
            .field("size_of_optional_header", &self.size_of_optional_header)
            .field("characteristics", &format_args!("{:#x}", self.characteristics))
            .finish()
    }
}

/// A COFF `IMAGE_SECTION_HEADER`, 40 bytes describing one section.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct SectionHeader {
    /// An 8-byte, null-padded name. There is no terminating null character if
    /// the name is exactly eight characters long. Longer names are stored as a
    /// forward slash (`/`) followed by the ASCII decimal offset of the name
    /// within the string table. Use [`ObjectFile::section_name`] to resolve
    /// either form.
    ///
    /// [`ObjectFile::section_name`]: crate::ObjectFile::section_name
    pub name: [u8; 8],

    /// The physical address of the section. Unused in object files; compilers
    /// leave this zero or mirror `virtual_address` in it.
    pub physical_address: u32,

    /// The address of the first byte of the section before relocation is
    /// applied.
    pub virtual_address: u32,

    /// The size of the section data on disk, in bytes.
    pub size_of_raw_data: u32,

    /// File offset of the section data, or zero if the section holds only
    /// uninitialized data.
    pub pointer_to_raw_data: u32,

    /// File offset of the relocation entries for the section, or zero.
    pub pointer_to_relocations: u32,

    /// File offset of the COFF line-number entries for the section, or zero.
    pub pointer_to_line_numbers: u32,

    /// The number of relocation entries for the section.
    pub number_of_relocations: u16,

    /// The number of line-number entries for the section.
    pub number_of_line_numbers: u16,

    /// The characteristics of the section.
    pub characteristics: SectionCharacteristics,
}

impl SectionHeader {
    pub(crate) fn parse(buf: &mut ParseBuffer<'_>) -> Result<Self> {
        let name_bytes = buf.take(8)?;
        let mut name = [0u8; 8];
        name.copy_from_slice(name_bytes);

        Ok(Self {
            name,
            physical_address: buf.parse_u32()?,
            virtual_address: buf.parse_u32()?,
            size_of_raw_data: buf.parse_u32()?,
            pointer_to_raw_data: buf.parse_u32()?,
            pointer_to_relocations: buf.parse_u32()?,
            pointer_to_line_numbers: buf.parse_u32()?,
            number_of_relocations: buf.parse_u16()?,
            number_of_line_numbers: buf.parse_u16()?,
            characteristics: buf.parse()?,
        })
    }
}

impl fmt::Debug for SectionHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionHeader")
            .field("name", &RawString::from(&self.name[..]))
            .field(
                "physical_address",
                &format_args!("{:#x}", self.physical_address),
            )
            .field(
                "virtual_address",
                &format_args!("{:#x}", self.virtual_address),
            )
            .field("size_of_raw_data", &self.size_of_raw_data)
            .field(
                "pointer_to_raw_data",
                &format_args!("{:#x}", self.pointer_to_raw_data),
            )
            .field(
                "pointer_to_relocations",
                &format_args!("{:#x}", self.pointer_to_relocations),
            )
            .field(
                "pointer_to_line_numbers",
                &format_args!("{:#x}", self.pointer_to_line_numbers),
            )
            .field("number_of_relocations", &self.number_of_relocations)
            .field("number_of_line_numbers", &self.number_of_line_numbers)
            .field("characteristics", &self.characteristics)
            .finish()
    }
}
