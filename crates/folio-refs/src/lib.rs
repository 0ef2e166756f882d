//! Indirect references and the session that owns them.
//!
//! An indirect reference stands in for a payload that lives in one or more
//! stores. It is created unbound, picks up an identity in each store the
//! first time it is needed there, and can be written (and rewritten) after
//! other objects already point at it.
//!
//! # Modules
//!
//! - [`error`] -- [`RefError`] and the [`RefResult`] alias
//! - [`binding`] -- the arena mapping each reference to its per-store identities
//! - [`session`] -- [`Session`], owner of stores, bindings and stream filters
//!
//! # Example
//!
//! ```
//! use folio_object::{Dictionary, Name};
//! use folio_refs::Session;
//! use folio_store::StoreConfig;
//!
//! let mut session = Session::new();
//! let store = session.memory_store(StoreConfig::default())?;
//!
//! // Mention the page tree before it exists.
//! let pages = session.new_reference()?;
//! let catalog = session.write_new(
//!     store,
//!     Dictionary::new().with("Type", Name::new("Catalog")).with("Pages", pages),
//! )?;
//! session.write(pages, Dictionary::new().with("Type", Name::new("Pages")))?;
//!
//! session.set_catalog(store, catalog)?;
//! let report = session.close(store)?;
//! assert_eq!(report.size, 3);
//! # Ok::<(), folio_refs::RefError>(())
//! ```

pub mod binding;
pub mod error;
pub mod session;

pub use binding::{Binding, BindingTable, StoreView};
pub use error::{RefError, RefResult};
pub use session::Session;
