use folio_types::IndirectRef;

/// Errors from object construction, serialization and filtering.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    /// A reference was serialized against a store it is not bound to.
    #[error("reference {0:?} is not bound to the store being written")]
    UnboundReference(IndirectRef),

    /// A real number cannot be written (NaN or infinite).
    #[error("cannot serialize non-finite real {0}")]
    NonFiniteReal(f64),

    /// No filter with this name is registered.
    #[error("unknown stream filter: {0}")]
    UnknownFilter(String),

    /// A filter failed to encode or decode.
    #[error("filter {filter} failed: {reason}")]
    Filter { filter: String, reason: String },

    /// The stream's `/Filter` entry is neither a name nor an array of names.
    #[error("malformed /Filter entry")]
    MalformedFilterEntry,

    /// I/O error from the output sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for object operations.
pub type ObjectResult<T> = Result<T, ObjectError>;
