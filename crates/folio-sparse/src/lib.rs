//! Resizable sparse arrays for folio.
//!
//! [`SparseArray`] is a tree of fixed-size clusters. Its capacity is always
//! a power of the cluster size; growing wraps the current root as child 0 of
//! a wider root and shrinking unwraps it again, so neither direction copies
//! the stored elements. Cluster nodes are allocated lazily on first write,
//! which keeps large mostly-empty tables cheap.
//!
//! [`SparseStack`] layers push/pop at both ends on top of the three array
//! primitives `at`, `set_size` and `len`.

pub mod array;
pub mod error;
pub mod stack;

pub use array::SparseArray;
pub use error::{SparseError, SparseResult};
pub use stack::SparseStack;
