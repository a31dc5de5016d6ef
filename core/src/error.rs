use crate::DocumentId;

/// Errors returned by [`SearchServer`](crate::SearchServer) operations.
///
/// Callers are expected to branch on the variant: `UnknownDocument` usually
/// means "nothing to match", `InvalidQuery` means the user input is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A stop word or document word contains a control character.
    #[error("invalid term: {word:?}")]
    InvalidTerm { word: String },

    /// Malformed minus-term syntax or an invalid token in query text.
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("document id {id} already exists")]
    DuplicateId { id: DocumentId },

    #[error("document id {id} is negative")]
    InvalidId { id: DocumentId },

    #[error("document {id} is not in the index")]
    UnknownDocument { id: DocumentId },

    #[error("unknown document status: {status}")]
    InvalidStatus { status: String },

    /// The dedicated worker pool could not be started.
    #[error("worker pool: {0}")]
    WorkerPool(String),
}

impl Error {
    pub(crate) fn invalid_query(reason: impl Into<String>) -> Self {
        Error::InvalidQuery { reason: reason.into() }
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::WorkerPool(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
