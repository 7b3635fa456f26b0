// Copyright 2025 coffview Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::common::*;
use crate::types::constants::*;

/// The raw leaf discriminator for type records.
pub type TypeLeaf = u16;

/// Encapsulates the decoded body of a type record.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeData<'t> {
    Modifier(ModifierType),
    Pointer(PointerType),
    Procedure(ProcedureType),
    ArgumentList(ArgumentList),
    FieldList(FieldList<'t>),
    Class(ClassType<'t>),
    FunctionId(FunctionIdType<'t>),
    StringId(StringIdType<'t>),
    BuildInfo(BuildInfoType),
    SubstringList(SubstringList),
    UdtSourceLine(UdtSourceLineType),
    /// A record of a leaf kind this crate does not recognize.
    ///
    /// Producers add leaves over time; unknown ones are carried through with
    /// their raw payload instead of failing the decode.
    Unknown { kind: TypeLeaf, data: &'t [u8] },
}

/// Parse one type record body out of a `ParseBuffer`.
pub(crate) fn parse_type_data<'t>(buf: &mut ParseBuffer<'t>) -> Result<TypeData<'t>> {
    let leaf = buf.parse_u16()?;

    match leaf {
        // https://github.com/Microsoft/microsoft-pdb/blob/082c5290e5aff028ae84e43affa8be717aa7af73/include/cvinfo.h#L1090-L1095
        LF_MODIFIER => {
            let underlying_type = buf.parse_u32()?;
            let attributes = buf.parse_u16()?;
            Ok(TypeData::Modifier(ModifierType {
                underlying_type,
                constant: attributes & 0x01 != 0,
                volatile: attributes & 0x02 != 0,
                unaligned: attributes & 0x04 != 0,
            }))
        }

        LF_POINTER => Ok(TypeData::Pointer(PointerType {
            underlying_type: buf.parse_u32()?,
            attributes: PointerAttributes(buf.parse_u32()?),
        })),

        LF_PROCEDURE => Ok(TypeData::Procedure(ProcedureType {
            return_type: parse_optional_index(buf)?,
            calling_convention: buf.parse_u8()?,
            attributes: FunctionAttributes(buf.parse_u8()?),
            parameter_count: buf.parse_u16()?,
            argument_list: buf.parse_u32()?,
        })),

        LF_ARGLIST => {
            let count = buf.parse_u32()? as usize;
            // reserve at most what the record can actually hold; a bogus
            // count fails on the first missing element
            let mut arguments = Vec::with_capacity(usize::min(count, buf.len() / 4));
            for _ in 0..count {
                arguments.push(buf.parse_u32()?);
            }
            Ok(TypeData::ArgumentList(ArgumentList { arguments }))
        }

        LF_FIELDLIST => {
            let mut fields = Vec::new();
            while !buf.is_empty() {
                parse_padding(buf)?;
                if buf.is_empty() {
                    break;
                }

                // Sub-records other than members have no carried length, so
                // an unrecognized one swallows the rest of the list.
                let kind = buf.parse_u16()?;
                if kind != LF_MEMBER {
                    let data = buf.take(buf.len())?;
                    fields.push(FieldData::Unknown { kind, data });
                    break;
                }

                fields.push(FieldData::Member(MemberType {
                    attributes: FieldAttributes(buf.parse_u16()?),
                    field_type: buf.parse_u32()?,
                    offset: buf.parse_u16()?,
                    name: buf.parse_cstring()?,
                }));
            }
            Ok(TypeData::FieldList(FieldList { fields }))
        }

        // https://github.com/Microsoft/microsoft-pdb/blob/082c5290e5aff028ae84e43affa8be717aa7af73/include/cvinfo.h#L1631-L1642
        LF_CLASS | LF_STRUCTURE => {
            let kind = match leaf {
                LF_CLASS => ClassKind::Class,
                _ => ClassKind::Struct,
            };
            let count = buf.parse_u16()?;
            let properties = TypeProperties(buf.parse_u16()?);
            let fields = parse_optional_index(buf)?;
            let derived_from = parse_optional_index(buf)?;
            let vtable_shape = parse_optional_index(buf)?;
            let name = buf.parse_cstring()?;
            let unique_name = if properties.has_unique_name() {
                Some(buf.parse_cstring()?)
            } else {
                None
            };

            Ok(TypeData::Class(ClassType {
                kind,
                count,
                properties,
                fields,
                derived_from,
                vtable_shape,
                name,
                unique_name,
            }))
        }

        LF_FUNC_ID => Ok(TypeData::FunctionId(FunctionIdType {
            scope: parse_optional_index(buf)?,
            function_type: buf.parse_u32()?,
            name: buf.parse_cstring()?,
        })),

        LF_STRING_ID => Ok(TypeData::StringId(StringIdType {
            id: buf.parse_u32()?,
            name: buf.parse_cstring()?,
        })),

        LF_BUILDINFO => {
            let count = buf.parse_u16()? as usize;
            let mut arguments = Vec::with_capacity(usize::min(count, buf.len() / 4));
            for _ in 0..count {
                arguments.push(buf.parse_u32()?);
            }
            Ok(TypeData::BuildInfo(BuildInfoType { arguments }))
        }

        LF_SUBSTR_LIST => {
            let count = buf.parse_u32()? as usize;
            let mut substrings = Vec::with_capacity(usize::min(count, buf.len() / 4));
            for _ in 0..count {
                substrings.push(buf.parse_u32()?);
            }
            Ok(TypeData::SubstringList(SubstringList { substrings }))
        }

        LF_UDT_SRC_LINE => Ok(TypeData::UdtSourceLine(UdtSourceLineType {
            udt: buf.parse_u32()?,
            source_file: buf.parse_u32()?,
            line: buf.parse_u32()?,
        })),

        _ => {
            let data = buf.take(buf.len())?;
            Ok(TypeData::Unknown { kind: leaf, data })
        }
    }
}

#[inline]
fn parse_optional_index(buf: &mut ParseBuffer<'_>) -> Result<Option<TypeIndex>> {
    let index = buf.parse_u32()?;
    if index == 0 || index == u32::from(u16::max_value()) {
        Ok(None)
    } else {
        Ok(Some(index))
    }
}

#[inline]
fn parse_padding(buf: &mut ParseBuffer<'_>) -> Result<()> {
    while !buf.is_empty() && buf.peek_u8()? >= 0xf0 {
        let padding = buf.parse_u8()?;
        if padding > 0xf0 {
            // low four bits indicate the amount of padding
            buf.take((padding & 0x0f) as usize - 1)?;
        }
    }
    Ok(())
}

/// The information parsed from a type record with kind `LF_MODIFIER`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ModifierType {
    /// The type being modified.
    pub underlying_type: TypeIndex,
    /// The type is `const` qualified.
    pub constant: bool,
    /// The type is `volatile` qualified.
    pub volatile: bool,
    /// The type is declared `__unaligned`.
    pub unaligned: bool,
}

/// The information parsed from a type record with kind `LF_POINTER`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PointerType {
    /// The type being pointed to.
    pub underlying_type: TypeIndex,
    /// Pointer attributes.
    pub attributes: PointerAttributes,
}

/// The information parsed from a type record with kind `LF_PROCEDURE`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProcedureType {
    /// The return type, or `None` for functions returning `void`.
    pub return_type: Option<TypeIndex>,
    /// The calling convention, a `CV_call_t` code.
    pub calling_convention: u8,
    /// Function attributes.
    pub attributes: FunctionAttributes,
    /// The number of parameters.
    pub parameter_count: u16,
    /// Type index of the `LF_ARGLIST` record holding the parameter types.
    pub argument_list: TypeIndex,
}

/// The information parsed from a type record with kind `LF_ARGLIST`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentList {
    /// Type indices of the argument types, in declaration order.
    pub arguments: Vec<TypeIndex>,
}

/// One sub-record of a field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldData<'t> {
    /// A data member, sub-record kind `LF_MEMBER`.
    Member(MemberType<'t>),
    /// A sub-record kind this crate does not decode. Since sub-records carry
    /// no length of their own, this terminates the list.
    Unknown { kind: TypeLeaf, data: &'t [u8] },
}

/// The information parsed from a type record with kind `LF_FIELDLIST`.
///
/// There is no count field; members repeat until the record's declared length
/// is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldList<'t> {
    pub fields: Vec<FieldData<'t>>,
}

/// A data member of a field list.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemberType<'t> {
    /// Field attributes.
    pub attributes: FieldAttributes,
    /// The type of this member.
    pub field_type: TypeIndex,
    /// Byte offset of this member within its parent.
    pub offset: u16,
    /// The member name.
    pub name: RawString<'t>,
}

/// Distinguishes `LF_CLASS` from `LF_STRUCTURE` records; the two share a
/// layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Struct,
}

/// The information parsed from a type record with kind `LF_CLASS` or
/// `LF_STRUCTURE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassType<'t> {
    pub kind: ClassKind,

    /// Count of elements in this class.
    pub count: u16,

    /// Type properties of this class.
    pub properties: TypeProperties,

    /// Type index of the `LF_FIELDLIST` record holding the fields, or `None`
    /// for forward references.
    pub fields: Option<TypeIndex>,

    /// Type index of the derivation list, if any.
    pub derived_from: Option<TypeIndex>,

    /// Type index of the virtual function table shape descriptor, if any.
    pub vtable_shape: Option<TypeIndex>,

    /// The declared name of this class.
    pub name: RawString<'t>,

    /// The mangled name, present when
    /// [`properties.has_unique_name()`](TypeProperties::has_unique_name) is
    /// set.
    pub unique_name: Option<RawString<'t>>,
}

/// The information parsed from a type record with kind `LF_FUNC_ID`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FunctionIdType<'t> {
    /// Id of the enclosing scope, or `None` for global functions.
    pub scope: Option<IdIndex>,
    /// Type index of the function's `LF_PROCEDURE` record.
    pub function_type: TypeIndex,
    /// The function name.
    pub name: RawString<'t>,
}

/// The information parsed from a type record with kind `LF_STRING_ID`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StringIdType<'t> {
    /// Id of an `LF_SUBSTR_LIST` this string continues, or zero.
    pub id: IdIndex,
    /// The string value.
    pub name: RawString<'t>,
}

/// The information parsed from a type record with kind `LF_BUILDINFO`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfoType {
    /// Ids of the build arguments: working directory, tool path, source file,
    /// output file and the command line.
    pub arguments: Vec<IdIndex>,
}

/// The information parsed from a type record with kind `LF_SUBSTR_LIST`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstringList {
    /// Ids of `LF_STRING_ID` records to be concatenated.
    pub substrings: Vec<IdIndex>,
}

/// The information parsed from a type record with kind `LF_UDT_SRC_LINE`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UdtSourceLineType {
    /// Type index of the user-defined type.
    pub udt: TypeIndex,
    /// Id of a string record holding the source file name.
    pub source_file: IdIndex,
    /// Line number of the definition.
    pub line: u32,
}

/*
typedef struct CV_prop_t {
unsigned short  packed      :1;     // true if structure is packed
unsigned short  ctor        :1;     // true if constructors or destructors present
unsigned short  ovlops      :1;     // true if overloaded operators present
unsigned short  isnested    :1;     // true if this is a nested class
unsigned short  cnested     :1;     // true if this class contains nested types
unsigned short  opassign    :1;     // true if overloaded assignment (=)
unsigned short  opcast      :1;     // true if casting methods
unsigned short  fwdref      :1;     // true if forward reference (incomplete defn)
unsigned short  scoped      :1;     // scoped definition
unsigned short  hasuniquename :1;   // true if there is a decorated name following the regular name
unsigned short  sealed      :1;     // true if class cannot be used as a base class
unsigned short  hfa         :2;     // CV_HFA_e
unsigned short  intrinsic   :1;     // true if class is an intrinsic type (e.g. __m128d)
unsigned short  mocom       :2;     // CV_MOCOM_UDT_e
} CV_prop_t;
*/
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TypeProperties(pub u16);
impl TypeProperties {
    /// Indicates if a type is packed via `#pragma pack` or similar.
    pub fn packed(self) -> bool {
        self.0 & 0x0001 != 0
    }

    /// Indicates if a type has constructors or destructors.
    pub fn constructors(self) -> bool {
        self.0 & 0x0002 != 0
    }

    /// Indicates if a type has any overloaded operators.
    pub fn overloaded_operators(self) -> bool {
        self.0 & 0x0004 != 0
    }

    /// Indicates if a type is a nested type, e.g. a `union` defined inside a `class`.
    pub fn is_nested_type(self) -> bool {
        self.0 & 0x0008 != 0
    }

    /// Indicates if a type contains nested types.
    pub fn contains_nested_types(self) -> bool {
        self.0 & 0x0010 != 0
    }

    /// Indicates if a class has overloaded the assignment operator.
    pub fn overloaded_assignment(self) -> bool {
        self.0 & 0x0020 != 0
    }

    pub fn overloaded_casting(self) -> bool {
        self.0 & 0x0040 != 0
    }

    /// Indicates if a type is a forward reference, i.e. an incomplete record
    /// that serves as a placeholder until a complete definition appears.
    pub fn forward_reference(self) -> bool {
        self.0 & 0x0080 != 0
    }

    pub fn scoped_definition(self) -> bool {
        self.0 & 0x0100 != 0
    }

    /// Indicates that a decorated name follows the regular name.
    pub fn has_unique_name(self) -> bool {
        self.0 & 0x0200 != 0
    }

    pub fn sealed(self) -> bool {
        self.0 & 0x0400 != 0
    }
}

/*
typedef struct CV_fldattr_t {
    unsigned short  access      :2;     // access protection CV_access_t
    unsigned short  mprop       :3;     // method properties CV_methodprop_t
    unsigned short  pseudo      :1;     // compiler generated fcn and does not exist
    unsigned short  noinherit   :1;     // true if class cannot be inherited
    unsigned short  noconstruct :1;     // true if class cannot be constructed
    unsigned short  compgenx    :1;     // compiler generated fcn and does exist
    unsigned short  sealed      :1;     // true if method cannot be overridden
    unsigned short  unused      :6;     // unused
} CV_fldattr_t;
*/
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldAttributes(pub u16);
impl FieldAttributes {
    /// The access protection, a `CV_access_t` value: 1 private, 2 protected,
    /// 3 public.
    #[inline]
    pub fn access(self) -> u8 {
        (self.0 & 0x0003) as u8
    }

    #[inline]
    fn method_properties(self) -> u8 {
        ((self.0 & 0x001c) >> 2) as u8
    }

    #[inline]
    pub fn is_static(self) -> bool {
        self.method_properties() == 0x02
    }

    #[inline]
    pub fn is_virtual(self) -> bool {
        self.method_properties() == 0x01
    }

    #[inline]
    pub fn is_pure_virtual(self) -> bool {
        self.method_properties() == 0x05
    }
}

/*
typedef struct CV_funcattr_t {
    unsigned char  cxxreturnudt :1;  // true if C++ style ReturnUDT
    unsigned char  ctor         :1;  // true if func is an instance constructor
    unsigned char  ctorvbase    :1;  // true if func is an instance constructor of a class with virtual bases
    unsigned char  unused       :5;  // unused
} CV_funcattr_t;
*/
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FunctionAttributes(pub u8);
impl FunctionAttributes {
    pub fn cxx_return_udt(self) -> bool {
        (self.0 & 0x01) > 0
    }
    pub fn is_constructor(self) -> bool {
        (self.0 & 0x02) > 0
    }
    pub fn is_constructor_with_virtual_bases(self) -> bool {
        (self.0 & 0x04) > 0
    }
}

/*
struct lfPointerAttr {
    unsigned long   ptrtype     :5; // ordinal specifying pointer type (CV_ptrtype_e)
    unsigned long   ptrmode     :3; // ordinal specifying pointer mode (CV_ptrmode_e)
    unsigned long   isflat32    :1; // true if 0:32 pointer
    unsigned long   isvolatile  :1; // TRUE if volatile pointer
    unsigned long   isconst     :1; // TRUE if const pointer
    unsigned long   isunaligned :1; // TRUE if unaligned pointer
    unsigned long   isrestrict  :1; // TRUE if restricted pointer (allow agressive opts)
    unsigned long   size        :6; // size of pointer (in bytes)
    unsigned long   ismocom     :1; // TRUE if it is a MoCOM pointer (^ or %)
    unsigned long   islref      :1; // TRUE if it is this pointer of member function with & ref-qualifier
    unsigned long   isrref      :1; // TRUE if it is this pointer of member function with && ref-qualifier
    unsigned long   unused      :10;// pad out to 32-bits for following cv_typ_t's
} attr;
*/
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PointerAttributes(pub u32);
impl PointerAttributes {
    /// The kind of pointer, a `CV_ptrtype_e` ordinal: `0x0a` is a 32-bit
    /// pointer and `0x0c` a 64-bit pointer.
    pub fn pointer_kind(self) -> u8 {
        (self.0 & 0x1f) as u8
    }

    /// The pointer mode, a `CV_ptrmode_e` ordinal.
    pub fn pointer_mode(self) -> u8 {
        ((self.0 >> 5) & 0x07) as u8
    }

    /// Is this a C++ reference, as opposed to a C pointer?
    pub fn is_reference(self) -> bool {
        matches!(self.pointer_mode(), 0x01 | 0x04)
    }

    /// Indicates if this is a 0:32 flat pointer.
    pub fn is_flat32(self) -> bool {
        (self.0 & 0x100) != 0
    }

    /// Indicates if this pointer is `volatile`.
    pub fn is_volatile(self) -> bool {
        (self.0 & 0x200) != 0
    }

    /// Indicates if this pointer is `const`.
    pub fn is_const(self) -> bool {
        (self.0 & 0x400) != 0
    }

    /// Indicates if this pointer is `__unaligned`.
    pub fn is_unaligned(self) -> bool {
        (self.0 & 0x800) != 0
    }

    /// Indicates if this pointer is `restrict`.
    pub fn is_restrict(self) -> bool {
        (self.0 & 0x1000) != 0
    }

    /// The size of the pointer in bytes.
    pub fn size(self) -> u8 {
        let size = ((self.0 >> 13) & 0x3f) as u8;
        if size != 0 {
            return size;
        }
        match self.pointer_kind() {
            0x0a => 4,
            0x0c => 8,
            _ => 0,
        }
    }
}
