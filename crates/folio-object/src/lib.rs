//! Object model for folio.
//!
//! Every storable value is an [`Object`]: a closed sum over null, booleans,
//! numbers, names, strings, arrays, dictionaries, streams and indirect
//! references.
//!
//! # Ownership
//!
//! Composites own their children exclusively. Handing a composite to
//! another owner goes through a [`Protected`] view:
//!
//! - reading through a protected view yields protected views, all the way down;
//! - [`Protected::unprotect`] deep-copies, producing a new independent owner;
//! - every insertion (`Array::push`, `Dictionary::insert`, ...) takes
//!   `impl Into<Object>`, and converting a protected view into an object
//!   unprotects it, so a composite never stores something it does not own.
//!
//! Leaf scalars are immutable and share their backing buffers on clone.
//! Indirect references are arena handles, so copying one never duplicates
//! the identity it names.
//!
//! # Serialization
//!
//! [`Object::write_to`] renders the textual body of an object. References
//! need a [`ReferenceTable`] for the store being written; without one they
//! render as the sentinel token `0 65535 R`.

pub mod array;
pub mod dictionary;
pub mod error;
pub mod filter;
pub mod object;
pub mod protect;
pub mod scalar;
pub mod serialize;
pub mod stream;

pub use array::Array;
pub use dictionary::Dictionary;
pub use error::{ObjectError, ObjectResult};
pub use filter::{AsciiHexFilter, Filter, FilterRegistry, FlateFilter};
pub use object::{Object, ObjectKind};
pub use protect::{
    Protected, ProtectedArray, ProtectedDictionary, ProtectedRef, ProtectedStream,
};
pub use scalar::{Name, Number, PdfString, StringForm};
pub use serialize::{Dereference, NoReferences, ReferenceTable};
pub use stream::Stream;
