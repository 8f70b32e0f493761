//! Error types for the `adk-vector` crate.

use thiserror::Error;

/// Errors that can occur in vector collection operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Invalid construction arguments or document fields.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A document with the same ID is already stored.
    #[error("document with ID '{0}' already exists")]
    DuplicateId(String),

    /// No document with the given ID is stored.
    #[error("document with ID '{0}' not found")]
    NotFound(String),

    /// Two vectors that must share a dimensionality do not.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimensionality that was required.
        expected: usize,
        /// The dimensionality that was supplied.
        actual: usize,
    },

    /// A zero-magnitude vector cannot be normalized.
    #[error("cannot normalize a zero vector")]
    ZeroVector,

    /// A vector component is NaN or infinite.
    #[error("vector contains a NaN or infinite component")]
    NonFinite,

    /// An operation that needs at least one input received none.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// The embedding function returned no vectors for a query.
    #[error("no embeddings generated for the query")]
    EmptyEmbedding,

    /// Every query of a multi-query search failed.
    #[error("all {count} queries failed")]
    AllQueriesFailed {
        /// Number of queries that were attempted.
        count: usize,
    },

    /// An error reported by the embedding function.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding function that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The embedding function returned a different number of vectors than inputs.
    #[error("embedding function returned {actual} vectors for {expected} inputs")]
    EmbeddingCountMismatch {
        /// Number of texts sent to the embedding function.
        expected: usize,
        /// Number of vectors it returned.
        actual: usize,
    },

    /// A background scoring task panicked or was cancelled.
    #[error("search task failed: {0}")]
    Task(String),
}

/// A convenience result type for vector collection operations.
pub type Result<T> = std::result::Result<T, VectorError>;
