//! Error types for reference operations.

use folio_object::ObjectError;
use folio_store::StoreError;
use folio_types::{IndirectRef, StoreId};

/// Errors that can occur during reference operations.
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    /// The underlying store rejected the operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Serializing an object failed.
    #[error("object error: {0}")]
    Object(#[from] ObjectError),

    /// The handle does not belong to this session.
    #[error("unknown reference {0:?}")]
    UnknownReference(IndirectRef),

    /// `write` on a reference bound to no store.
    #[error("{0:?} is not bound to any store")]
    UnboundReference(IndirectRef),

    /// The reference has no identity in the given store.
    #[error("{reference:?} is not bound to {store}")]
    NotBound { reference: IndirectRef, store: StoreId },

    /// `dereference` on a reference that has never been written.
    #[error("{0:?} has no source store")]
    NoSource(IndirectRef),

    /// Following references led back to one already visited.
    #[error("reference cycle through {0:?}")]
    CyclicReference(IndirectRef),

    /// The store handle was closed or never opened.
    #[error("{0} is closed")]
    StoreClosed(StoreId),

    /// No more handles can be issued from an arena.
    #[error("{0} arena is full")]
    ArenaFull(&'static str),
}

/// Result alias for reference operations.
pub type RefResult<T> = Result<T, RefError>;
