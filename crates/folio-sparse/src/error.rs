/// Errors from sparse array operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SparseError {
    /// Access past the logical size.
    #[error("index {index} out of range for size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// Cluster sizes below two cannot form a tree.
    #[error("invalid cluster size {0}: must be at least 2")]
    InvalidClusterSize(usize),

    /// Requested size exceeds the largest representable capacity.
    #[error("capacity overflow growing to {requested}")]
    CapacityOverflow { requested: usize },

    /// A node's kind disagrees with the capacity of its level.
    #[error("node shape does not match capacity {capacity}")]
    ShapeMismatch { capacity: usize },
}

/// Result alias for sparse array operations.
pub type SparseResult<T> = Result<T, SparseError>;
