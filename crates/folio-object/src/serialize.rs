//! Seams between objects and the stores that number them.

use std::io::Write;

use folio_types::{IndirectRef, ObjectId};

use crate::error::{ObjectError, ObjectResult};
use crate::protect::Protected;

/// Maps references to their identity in one particular store.
///
/// A reference token is only meaningful relative to one store's numbering,
/// so serialization always takes at most one table.
pub trait ReferenceTable {
    /// Identity of `reference` in this store, or `None` if unbound here.
    fn identity(&self, reference: IndirectRef) -> Option<ObjectId>;
}

/// A table that binds nothing, for payloads known to hold no references.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoReferences;

impl ReferenceTable for NoReferences {
    fn identity(&self, _reference: IndirectRef) -> Option<ObjectId> {
        None
    }
}

/// Resolves references back to their payloads.
pub trait Dereference {
    type Error;

    /// Follow `reference` (and any reference it resolves to) to a
    /// non-reference payload.
    fn dereference(&self, reference: IndirectRef) -> Result<Protected<'_>, Self::Error>;
}

/// Write the `n g R` token for `reference`.
///
/// Without a table the sentinel token is written instead, which keeps
/// diagnostic printing of unbound graphs possible.
pub fn write_reference<W: Write + ?Sized>(
    out: &mut W,
    reference: IndirectRef,
    refs: Option<&dyn ReferenceTable>,
) -> ObjectResult<()> {
    let id = match refs {
        None => ObjectId::sentinel(),
        Some(table) => table
            .identity(reference)
            .ok_or(ObjectError::UnboundReference(reference))?,
    };
    write!(out, "{id}")?;
    Ok(())
}
