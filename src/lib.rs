// Copyright 2025 coffview Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The `coffview` crate decodes COFF object files and the CodeView debug
//! information embedded in them: the file and section headers, the COFF
//! symbol and string tables, and the `.debug$S` symbol and `.debug$T` type
//! streams emitted by compilers that target Windows.
//!
//! Decoding is read-only and lazy. The caller supplies the whole file as a
//! byte slice; every decoded value is a view into that slice, so nothing is
//! copied until the caller asks for it. Rendering the decoded records as text
//! is left to the caller.
//!
//! # Example
//!
//! ```no_run
//! # fn load() -> &'static [u8] { unimplemented!() }
//! # fn test() -> coffview::Result<()> {
//! use coffview::{FallibleIterator, ObjectFile, SectionClass, Subsection};
//!
//! let object = ObjectFile::parse(load())?;
//!
//! for section in object.sections() {
//!     if object.section_class(section)? != SectionClass::DebugSymbols {
//!         continue;
//!     }
//!
//!     let stream = object.symbol_stream(section)?;
//!     let mut subsections = stream.subsections();
//!     while let Some(subsection) = subsections.next()? {
//!         if let Subsection::Symbols(mut symbols) = subsection {
//!             while let Some(symbol) = symbols.next()? {
//!                 println!("{:?}", symbol.parse()?);
//!             }
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// modules
mod coff;
mod common;
mod object;
mod strings;
mod symbols;
mod symtab;
mod types;

// exports
pub use crate::coff::*;
pub use crate::common::{Error, IdIndex, RawString, Result, StringRef, TypeIndex};
pub use crate::object::{ObjectFile, SectionClass};
pub use crate::strings::StringTable;
pub use crate::symbols::*;
pub use crate::symtab::*;
pub use crate::types::*;

// re-export FallibleIterator for convenience
#[doc(no_inline)]
pub use fallible_iterator::FallibleIterator;
