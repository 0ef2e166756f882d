//! Arena handles.
//!
//! Stores and references live in arenas owned by a session. These handles
//! are plain indices into those arenas: copying a handle never duplicates
//! what it names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to an indirect reference in a session's binding arena.
///
/// Two copies of the same `IndirectRef` always denote the same deferred
/// object, whichever stores it ends up bound to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndirectRef(u32);

impl IndirectRef {
    /// Wrap a raw arena index.
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// The raw arena index.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for IndirectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndirectRef(#{})", self.0)
    }
}

/// Handle to an open store in a session's store arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreId(u32);

impl StoreId {
    /// Wrap a raw arena index.
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// The raw arena index.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreId(#{})", self.0)
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store#{}", self.0)
    }
}
