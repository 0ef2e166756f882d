//! Foundation types for folio.
//!
//! This crate provides the identity and handle types shared by every other
//! folio crate.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- `(number, generation)` identity of an object within one store
//! - [`IndirectRef`] -- arena handle for a deferred, store-independent reference
//! - [`StoreId`] -- arena handle for an open object store

pub mod error;
pub mod handle;
pub mod identity;

pub use error::TypeError;
pub use handle::{IndirectRef, StoreId};
pub use identity::{ObjectId, MAX_GENERATION};
