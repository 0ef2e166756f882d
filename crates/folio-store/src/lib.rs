//! Object stores for folio.
//!
//! An [`ObjectStore`] is one output file under construction. It issues
//! `(number, generation)` identities from a cross-reference table, appends
//! framed object bodies as they are written, and finishes with the table
//! and trailer when closed.
//!
//! # Identity lifecycle
//!
//! 1. `reserve` takes the lowest-numbered reusable free slot, or appends one.
//! 2. `write_at` records the current output offset and appends the body.
//! 3. `delete` bumps the generation and links the slot into the free list,
//!    or retires it for good once the generation is exhausted.
//!
//! # Output layout
//!
//! ```text
//! %PDF-1.4
//! 1 0 obj
//! <</Type /Catalog>>
//! endobj
//! xref
//! 0 2
//! 0000000000 65535 f
//! 0000000009 00000 n
//! trailer
//! <</Size 2 /Root 1 0 R>>
//! startxref
//! 43
//! %%EOF
//! ```
//!
//! Only slots changed since the store was opened are listed, grouped into
//! maximal contiguous segments.

pub mod config;
pub mod error;
pub mod output;
pub mod slot;
pub mod store;
pub mod xref;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use output::Output;
pub use slot::SlotRecord;
pub use store::{CloseReport, ObjectStore};
pub use xref::{Release, XrefTable};
