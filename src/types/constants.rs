// Copyright 2025 coffview Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

// Leaf codes for `.debug$T` type records, from:
//  https://github.com/Microsoft/microsoft-pdb/blob/082c5290e5aff028ae84e43affa8be717aa7af73/include/cvinfo.h#L772

/// The first type index available for user-defined types. Records in the
/// stream are numbered upwards from here in encounter order; lower indices
/// denote built-in primitive types.
pub const TYPE_INDEX_BASE: u32 = 0x1000;

pub const LF_MODIFIER: u16 = 0x1001; // const/volatile/unaligned wrapper
pub const LF_POINTER: u16 = 0x1002;
pub const LF_PROCEDURE: u16 = 0x1008;
pub const LF_ARGLIST: u16 = 0x1201;
pub const LF_FIELDLIST: u16 = 0x1203;
pub const LF_CLASS: u16 = 0x1504;
pub const LF_STRUCTURE: u16 = 0x1505;
pub const LF_MEMBER: u16 = 0x150d; // field list sub-record
pub const LF_FUNC_ID: u16 = 0x1601; // global function id
pub const LF_BUILDINFO: u16 = 0x1603; // build command line and paths
pub const LF_SUBSTR_LIST: u16 = 0x1604; // list of substrings for LF_STRING_ID
pub const LF_STRING_ID: u16 = 0x1605;
pub const LF_UDT_SRC_LINE: u16 = 0x1606; // source location of a UDT definition
