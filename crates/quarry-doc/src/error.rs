use quarry_types::DocId;
use thiserror::Error;

/// Errors from document retrieval operations.
///
/// Key absence is never an error anywhere in Quarry: a missing key reads as
/// an empty [`quarry_types::KeyValue`]. The variants here split into two
/// classes. [`DatabaseClosed`](BackendError::DatabaseClosed) means a handle
/// outlived its database, a caller-lifetime violation that ordinary callers
/// are not expected to handle. The remaining variants are retrieval
/// failures from the concrete backend; a match loop can catch them and skip
/// the one bad document.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The database that minted this handle has been closed or dropped.
    #[error("database closed while a document handle was still live")]
    DatabaseClosed,

    /// No document with this id exists in the database.
    #[error("document not found: {0}")]
    DocNotFound(DocId),

    /// The stored record for this document is corrupt or undecodable.
    #[error("corrupt record for document {did}: {reason}")]
    CorruptRecord { did: DocId, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl BackendError {
    /// True for the caller-lifetime-violation class: the originating
    /// database is gone. Indicates a bug in the caller, not a condition to
    /// retry.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::DatabaseClosed)
    }

    /// True for per-document retrieval failures a consumer may choose to
    /// skip without aborting a whole match operation.
    pub fn is_retrieval_failure(&self) -> bool {
        matches!(
            self,
            Self::CorruptRecord { .. } | Self::Io(_) | Self::Serialization(_)
        )
    }
}

/// Result alias for backend and document operations.
pub type BackendResult<T> = Result<T, BackendError>;
