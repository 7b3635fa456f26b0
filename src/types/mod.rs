// Copyright 2025 coffview Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The CodeView type stream stored in `.debug$T` sections.
//!
//! The stream is a flat sequence of length-prefixed type records. There is no
//! index table; a record's position assigns it a [`TypeIndex`], counted
//! upwards from 0x1000, and other records refer to it by that number.

use std::fmt;

use scroll::{Pread, LE};

use crate::common::*;
use crate::FallibleIterator;

mod constants;
mod data;

pub use self::constants::*;
pub use self::data::*;

use crate::symbols::CV_SIGNATURE_C13;

/// A `.debug$T` stream.
///
/// Unlike the symbol stream, a signature mismatch here is only logged: some
/// producers omit or alter the signature while emitting records this crate
/// can still decode.
#[derive(Debug)]
pub struct TypeStream<'t> {
    data: &'t [u8],
    base: usize,
}

impl<'t> TypeStream<'t> {
    pub(crate) fn parse(data: &'t [u8], base: usize) -> Result<Self> {
        let mut buf = ParseBuffer::with_offset(data, base);
        let signature = buf.parse_u32()?;
        if signature != CV_SIGNATURE_C13 {
            log::warn!(
                "type stream signature {:#x} does not match the expected {:#x}, decoding anyway",
                signature,
                CV_SIGNATURE_C13
            );
        }

        Ok(TypeStream {
            data: &data[4..],
            base: base + 4,
        })
    }

    /// Returns an iterator over the records of this stream.
    pub fn iter(&self) -> TypeIter<'t> {
        TypeIter {
            buf: ParseBuffer::with_offset(self.data, self.base),
            type_index: TYPE_INDEX_BASE,
        }
    }
}

/// Represents one record from the type stream.
///
/// The record's bytes are not inspected until [`parse`](Self::parse) is
/// called, which decodes them into a [`TypeData`].
#[derive(Copy, Clone, PartialEq)]
pub struct Type<'t> {
    index: TypeIndex,
    data: &'t [u8],
    offset: usize,
}

impl<'t> Type<'t> {
    /// The position-derived index of this record.
    #[inline]
    pub fn index(&self) -> TypeIndex {
        self.index
    }

    /// Returns the raw leaf code of this record.
    #[inline]
    pub fn raw_leaf(&self) -> TypeLeaf {
        debug_assert!(self.data.len() >= 2);
        self.data.pread_with(0, LE).unwrap_or_default()
    }

    /// Returns the raw bytes of this record, including the leaf code but not
    /// the preceding length field.
    #[inline]
    pub fn raw_bytes(&self) -> &'t [u8] {
        self.data
    }

    /// Parse this record into the `TypeData` it contains.
    ///
    /// Errors report the absolute position of the offending byte within the
    /// file, not a record-relative one.
    pub fn parse(&self) -> Result<TypeData<'t>> {
        let mut buf = ParseBuffer::with_offset(self.data, self.offset);
        parse_type_data(&mut buf)
    }
}

impl<'t> fmt::Debug for Type<'t> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type{{ index: {:#x}, leaf: {:#x} [{} bytes] }}",
            self.index,
            self.raw_leaf(),
            self.data.len()
        )
    }
}

/// A source of [`Type`]s from a type stream.
#[derive(Debug)]
pub struct TypeIter<'t> {
    buf: ParseBuffer<'t>,
    type_index: TypeIndex,
}

impl<'t> FallibleIterator for TypeIter<'t> {
    type Item = Type<'t>;
    type Error = Error;

    fn next(&mut self) -> Result<Option<Self::Item>> {
        if self.buf.is_empty() {
            return Ok(None);
        }

        let offset = self.buf.offset();

        // The length counts the leaf code but not the length field itself.
        let length = self.buf.parse_u16()? as usize;
        if length < 2 {
            return Err(Error::TypeTooShort(offset));
        }

        let base = self.buf.offset();
        let data = self.buf.take(length)?;
        let index = self.type_index;
        self.type_index += 1;

        Ok(Some(Type {
            index,
            data,
            offset: base,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_record(leaf: u16, payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&((payload.len() + 2) as u16).to_le_bytes());
        bytes.extend_from_slice(&leaf.to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    fn stream(records: &[Vec<u8>]) -> Vec<u8> {
        let mut bytes = CV_SIGNATURE_C13.to_le_bytes().to_vec();
        for record in records {
            bytes.extend_from_slice(record);
        }
        bytes
    }

    #[test]
    fn test_index_assignment() {
        let records: Vec<_> = (0..3)
            .map(|_| type_record(LF_POINTER, &[0; 8]))
            .collect();
        let data = stream(&records);

        let types = TypeStream::parse(&data, 0).expect("parse");
        let indices: Vec<_> = types.iter().map(|ty| Ok(ty.index())).collect().expect("collect");
        assert_eq!(indices, vec![0x1000, 0x1001, 0x1002]);
    }

    #[test]
    fn test_arg_list() {
        let mut payload = 2u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&0x1000u32.to_le_bytes());
        payload.extend_from_slice(&0x1001u32.to_le_bytes());
        let data = stream(&[type_record(LF_ARGLIST, &payload)]);

        let types = TypeStream::parse(&data, 0).expect("parse");
        let ty = types.iter().next().expect("next").expect("type");
        assert_eq!(ty.index(), 0x1000);
        assert_eq!(
            ty.parse().expect("parse"),
            TypeData::ArgumentList(ArgumentList {
                arguments: vec![0x1000, 0x1001],
            })
        );
    }

    #[test]
    fn test_modifier() {
        let mut payload = 0x1234u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&0x0003u16.to_le_bytes()); // const + volatile
        let data = stream(&[type_record(LF_MODIFIER, &payload)]);

        let types = TypeStream::parse(&data, 0).expect("parse");
        let ty = types.iter().next().expect("next").expect("type");
        assert_eq!(
            ty.parse().expect("parse"),
            TypeData::Modifier(ModifierType {
                underlying_type: 0x1234,
                constant: true,
                volatile: true,
                unaligned: false,
            })
        );
    }

    #[test]
    fn test_pointer() {
        let mut payload = 0x1000u32.to_le_bytes().to_vec();
        // 64-bit pointer, const
        payload.extend_from_slice(&0x0001_040cu32.to_le_bytes());
        let data = stream(&[type_record(LF_POINTER, &payload)]);

        let types = TypeStream::parse(&data, 0).expect("parse");
        let parsed = types.iter().next().expect("next").expect("type").parse();
        match parsed.expect("parse") {
            TypeData::Pointer(ptr) => {
                assert_eq!(ptr.underlying_type, 0x1000);
                assert_eq!(ptr.attributes.pointer_kind(), 0x0c);
                assert!(ptr.attributes.is_const());
                assert!(!ptr.attributes.is_reference());
                assert_eq!(ptr.attributes.size(), 8);
            }
            other => panic!("expected pointer, got {:?}", other),
        }
    }

    #[test]
    fn test_structure() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&1u16.to_le_bytes()); // count
        payload.extend_from_slice(&0x0200u16.to_le_bytes()); // has_unique_name
        payload.extend_from_slice(&0x1002u32.to_le_bytes()); // field list
        payload.extend_from_slice(&0u32.to_le_bytes()); // derived
        payload.extend_from_slice(&0u32.to_le_bytes()); // vshape
        payload.extend_from_slice(b"point\0.?AUpoint@@\0");
        let data = stream(&[type_record(LF_STRUCTURE, &payload)]);

        let types = TypeStream::parse(&data, 0).expect("parse");
        let parsed = types.iter().next().expect("next").expect("type").parse();
        match parsed.expect("parse") {
            TypeData::Class(class) => {
                assert_eq!(class.kind, ClassKind::Struct);
                assert_eq!(class.count, 1);
                assert!(class.properties.has_unique_name());
                assert_eq!(class.fields, Some(0x1002));
                assert_eq!(class.derived_from, None);
                assert_eq!(class.vtable_shape, None);
                assert_eq!(class.name, RawString::from("point"));
                assert_eq!(class.unique_name, Some(RawString::from(".?AUpoint@@")));
            }
            other => panic!("expected class, got {:?}", other),
        }
    }

    #[test]
    fn test_field_list() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&LF_MEMBER.to_le_bytes());
        payload.extend_from_slice(&0x0003u16.to_le_bytes()); // public
        payload.extend_from_slice(&0x0074u32.to_le_bytes()); // T_INT4
        payload.extend_from_slice(&0u16.to_le_bytes()); // offset
        payload.extend_from_slice(b"x\0");
        payload.push(0xf1); // one byte of padding
        payload.extend_from_slice(&LF_MEMBER.to_le_bytes());
        payload.extend_from_slice(&0x0003u16.to_le_bytes());
        payload.extend_from_slice(&0x0074u32.to_le_bytes());
        payload.extend_from_slice(&4u16.to_le_bytes());
        payload.extend_from_slice(b"y\0");
        let data = stream(&[type_record(LF_FIELDLIST, &payload)]);

        let types = TypeStream::parse(&data, 0).expect("parse");
        let parsed = types.iter().next().expect("next").expect("type").parse();
        match parsed.expect("parse") {
            TypeData::FieldList(list) => {
                assert_eq!(list.fields.len(), 2);
                assert_eq!(
                    list.fields[0],
                    FieldData::Member(MemberType {
                        attributes: FieldAttributes(3),
                        field_type: 0x74,
                        offset: 0,
                        name: RawString::from("x"),
                    })
                );
                match &list.fields[1] {
                    FieldData::Member(member) => {
                        assert_eq!(member.offset, 4);
                        assert_eq!(member.name, RawString::from("y"));
                    }
                    other => panic!("expected member, got {:?}", other),
                }
            }
            other => panic!("expected field list, got {:?}", other),
        }
    }

    #[test]
    fn test_procedure() {
        let mut payload = 0x0074u32.to_le_bytes().to_vec(); // returns T_INT4
        payload.push(0); // near C call
        payload.push(0); // no attributes
        payload.extend_from_slice(&2u16.to_le_bytes());
        payload.extend_from_slice(&0x1000u32.to_le_bytes());
        let data = stream(&[type_record(LF_PROCEDURE, &payload)]);

        let types = TypeStream::parse(&data, 0).expect("parse");
        let parsed = types.iter().next().expect("next").expect("type").parse();
        match parsed.expect("parse") {
            TypeData::Procedure(proc) => {
                assert_eq!(proc.return_type, Some(0x74));
                assert_eq!(proc.calling_convention, 0);
                assert!(!proc.attributes.is_constructor());
                assert_eq!(proc.parameter_count, 2);
                assert_eq!(proc.argument_list, 0x1000);
            }
            other => panic!("expected procedure, got {:?}", other),
        }
    }

    #[test]
    fn test_function_id() {
        let mut payload = 0u32.to_le_bytes().to_vec(); // global scope
        payload.extend_from_slice(&0x1001u32.to_le_bytes());
        payload.extend_from_slice(b"main\0");
        let data = stream(&[type_record(LF_FUNC_ID, &payload)]);

        let types = TypeStream::parse(&data, 0).expect("parse");
        let parsed = types.iter().next().expect("next").expect("type").parse();
        assert_eq!(
            parsed.expect("parse"),
            TypeData::FunctionId(FunctionIdType {
                scope: None,
                function_type: 0x1001,
                name: RawString::from("main"),
            })
        );
    }

    #[test]
    fn test_substring_list() {
        let mut payload = 2u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&0x1003u32.to_le_bytes());
        payload.extend_from_slice(&0x1004u32.to_le_bytes());
        let data = stream(&[type_record(LF_SUBSTR_LIST, &payload)]);

        let types = TypeStream::parse(&data, 0).expect("parse");
        let parsed = types.iter().next().expect("next").expect("type").parse();
        assert_eq!(
            parsed.expect("parse"),
            TypeData::SubstringList(SubstringList {
                substrings: vec![0x1003, 0x1004],
            })
        );
    }

    #[test]
    fn test_udt_source_line() {
        let mut payload = 0x1000u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&0x1005u32.to_le_bytes());
        payload.extend_from_slice(&42u32.to_le_bytes());
        let data = stream(&[type_record(LF_UDT_SRC_LINE, &payload)]);

        let types = TypeStream::parse(&data, 0).expect("parse");
        let parsed = types.iter().next().expect("next").expect("type").parse();
        assert_eq!(
            parsed.expect("parse"),
            TypeData::UdtSourceLine(UdtSourceLineType {
                udt: 0x1000,
                source_file: 0x1005,
                line: 42,
            })
        );
    }

    #[test]
    fn test_arg_list_count_overrun() {
        // a bogus count far beyond the record's bytes must fail cleanly on
        // the first missing element, reporting the absolute offset
        let mut payload = 0x4000_0000u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&0x1000u32.to_le_bytes());
        let data = stream(&[type_record(LF_ARGLIST, &payload)]);

        let types = TypeStream::parse(&data, 0).expect("parse");
        let ty = types.iter().next().expect("next").expect("type");
        match ty.parse() {
            Err(Error::TruncatedInput(16)) => (),
            other => panic!("expected truncation at 16, got {:?}", other),
        }
    }

    #[test]
    fn test_build_info() {
        let mut payload = 3u16.to_le_bytes().to_vec();
        for id in &[0x1001u32, 0x1002, 0x1003] {
            payload.extend_from_slice(&id.to_le_bytes());
        }
        let data = stream(&[type_record(LF_BUILDINFO, &payload)]);

        let types = TypeStream::parse(&data, 0).expect("parse");
        let parsed = types.iter().next().expect("next").expect("type").parse();
        assert_eq!(
            parsed.expect("parse"),
            TypeData::BuildInfo(BuildInfoType {
                arguments: vec![0x1001, 0x1002, 0x1003],
            })
        );
    }

    #[test]
    fn test_unknown_leaf_preserves_bytes() {
        let data = stream(&[
            type_record(0x1999, &[1, 2, 3, 4]),
            type_record(LF_STRING_ID, &[0, 0, 0, 0, b'h', b'i', 0]),
        ]);

        let types = TypeStream::parse(&data, 0).expect("parse");
        let mut iter = types.iter();

        let first = iter.next().expect("next").expect("type");
        assert_eq!(
            first.parse().expect("parse"),
            TypeData::Unknown {
                kind: 0x1999,
                data: &[1, 2, 3, 4],
            }
        );

        // the walk continues past the unknown record
        let second = iter.next().expect("next").expect("type");
        assert_eq!(second.index(), 0x1001);
        assert_eq!(
            second.parse().expect("parse"),
            TypeData::StringId(StringIdType {
                id: 0,
                name: RawString::from("hi"),
            })
        );
    }

    #[test]
    fn test_truncated_record() {
        // declared length extends one byte past the stream end
        let mut data = CV_SIGNATURE_C13.to_le_bytes().to_vec();
        data.extend_from_slice(&5u16.to_le_bytes());
        data.extend_from_slice(&LF_POINTER.to_le_bytes());
        data.extend_from_slice(&[0, 0]); // 4 of 5 declared bytes present

        let types = TypeStream::parse(&data, 0).expect("parse");
        match types.iter().next() {
            Err(Error::TruncatedInput(_)) => (),
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn test_record_too_short() {
        let mut data = CV_SIGNATURE_C13.to_le_bytes().to_vec();
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&[0; 2]);

        let types = TypeStream::parse(&data, 0).expect("parse");
        match types.iter().next() {
            Err(Error::TypeTooShort(4)) => (),
            other => panic!("expected short record error, got {:?}", other),
        }
    }
}
