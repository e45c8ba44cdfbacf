//! Registry document parsing: namespaced RDF/XML and SPDX JSON, converted to
//! license and exception details.

mod error;
pub use error::{ConvertError, EntryKind, ParseError};

pub mod convert;
pub mod extract;
pub mod json;
pub mod names;
pub mod namespaces;
pub mod xml;

pub use convert::{
    ListedEntry, candidate_id, convert_document, convert_exception, convert_license,
    listed_exceptions, listed_licenses,
};
pub use json::IndexEntry;
pub use names::QualifiedName;
pub use namespaces::Namespaces;
pub use xml::{Document, Element, parse_document};
