use folio_object::ObjectError;
use folio_sparse::SparseError;
use folio_types::ObjectId;

/// Errors from object store operations.
///
/// Every variant except `Io` marks a broken usage contract: callers are
/// expected to fix the program, not retry.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The cross-reference table's backing array rejected an access.
    #[error("table error: {0}")]
    Sparse(#[from] SparseError),

    /// The identity was never reserved, or its slot is free.
    #[error("{0} is not reserved")]
    NotReserved(ObjectId),

    /// The identity's generation no longer matches its slot.
    #[error("stale identity {id}: slot is at generation {current}")]
    StaleIdentity { id: ObjectId, current: u16 },

    /// A payload was already written for this identity.
    #[error("{0} already written")]
    DoubleWrite(ObjectId),

    /// The identity was reserved but nothing has been written for it yet.
    #[error("{0} has no payload")]
    NotWritten(ObjectId),

    /// No more object numbers can be issued.
    #[error("cross-reference table is full")]
    TableFull,

    /// `close` was called before a catalog was registered.
    #[error("no catalog set")]
    MissingCatalog,

    /// `close` was called while reserved identities were still unwritten.
    #[error("{count} reserved object(s) never written, first {first}")]
    UnwrittenObjects { count: usize, first: ObjectId },

    /// The requested feature is a documented gap.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Invalid store configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Payload serialization failed.
    #[error("object error: {0}")]
    Object(#[from] ObjectError),

    /// I/O error from the output stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
