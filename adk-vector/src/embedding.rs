//! Embedding function trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A capability that turns a batch of texts into embedding vectors.
///
/// Implementations wrap a specific embedding backend (a remote API, a local
/// model, a test double) behind a single async call. The `purpose` tag tells
/// the backend whether it is embedding documents for storage or a query for
/// retrieval, so asymmetric encoders can pick the right mode. The tags come
/// from [`CollectionConfig`](crate::CollectionConfig).
///
/// The returned vectors must be in the same order as `texts` and of the same
/// length. Vectors need not be normalized; the collection normalizes them.
/// Errors are propagated to the caller unchanged.
///
/// # Example
///
/// ```rust,ignore
/// use adk_vector::{EmbeddingFunction, Result};
///
/// struct MyEmbedder;
///
/// #[async_trait::async_trait]
/// impl EmbeddingFunction for MyEmbedder {
///     async fn embed(&self, texts: &[String], purpose: &str) -> Result<Vec<Vec<f32>>> {
///         call_backend(texts, purpose).await
///     }
/// }
/// ```
#[async_trait]
pub trait EmbeddingFunction: Send + Sync {
    /// Generate one embedding vector per input text.
    async fn embed(&self, texts: &[String], purpose: &str) -> Result<Vec<Vec<f32>>>;
}
