// Copyright 2025 coffview Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

// Constants for the `.debug$S` stream, from:
//  https://github.com/Microsoft/microsoft-pdb/blob/082c5290e5aff028ae84e43affa8be717aa7af73/include/cvinfo.h

/// The stream signature written by C13-era compilers. Everything older uses a
/// layout this crate does not attempt to decode.
pub const CV_SIGNATURE_C13: u32 = 4;

/// Subsection holding CodeView symbol records.
pub const DEBUG_S_SYMBOLS: u32 = 0xf1;
/// Subsection holding line number tables.
pub const DEBUG_S_LINES: u32 = 0xf2;
/// Subsection holding NUL-terminated file name strings.
pub const DEBUG_S_STRINGTABLE: u32 = 0xf3;
/// Subsection holding source file checksums.
pub const DEBUG_S_FILECHKSMS: u32 = 0xf4;

pub const S_OBJNAME: u16 = 0x1101; // path to object file name
pub const S_UNAMESPACE: u16 = 0x1124; // using namespace
pub const S_COMPILE3: u16 = 0x113c; // replacement for S_COMPILE2
pub const S_BUILDINFO: u16 = 0x114c; // build information
