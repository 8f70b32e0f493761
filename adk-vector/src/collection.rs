//! In-memory document collection.
//!
//! A [`Collection`] owns a map from document ID to [`Document`] behind a
//! single `tokio::sync::RwLock`. Reads share the lock; writers hold it
//! exclusively, but only to validate and commit. Segmentation and the
//! embedding round trip always happen before the lock is taken, so a slow
//! embedding backend never blocks readers or unrelated writers.
//!
//! # Example
//!
//! ```rust,ignore
//! use adk_vector::{Collection, CollectionConfig, Document};
//!
//! let collection = Collection::builder()
//!     .config(CollectionConfig::builder().name("docs").chunk_size(100).chunk_overlap(10).build()?)
//!     .embedding_function(Arc::new(my_embedder))
//!     .build()?;
//!
//! collection.add_document(Document::new("doc1", "some text")).await?;
//! let results = collection.search("query", 5).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::chunking::Segmenter;
use crate::config::CollectionConfig;
use crate::document::{Document, Metadata, MetadataValue, Segment};
use crate::embedding::EmbeddingFunction;
use crate::error::{Result, VectorError};
use crate::vector::normalize;

/// Documents plus the embedding dimensionality pinned by the first stored batch.
#[derive(Debug, Default)]
pub(crate) struct CollectionState {
    pub(crate) documents: HashMap<String, Arc<Document>>,
    pub(crate) dimensions: Option<usize>,
}

impl CollectionState {
    /// Pin the dimensionality on first use and reject segments of another width.
    fn check_dimensions(&mut self, segments: &[Segment]) -> Result<()> {
        let Some(actual) = segments.first().map(|s| s.embedding.len()) else {
            return Ok(());
        };
        match self.dimensions {
            Some(expected) if expected != actual => {
                Err(VectorError::DimensionMismatch { expected, actual })
            }
            Some(_) => Ok(()),
            None => {
                self.dimensions = Some(actual);
                Ok(())
            }
        }
    }
}

/// A named, thread-safe collection of embedded documents.
///
/// Construct one via [`Collection::builder()`]. Share it across tasks with
/// an `Arc`; every method takes `&self`.
pub struct Collection {
    config: CollectionConfig,
    segmenter: Segmenter,
    pub(crate) embedding_function: Arc<dyn EmbeddingFunction>,
    pub(crate) state: RwLock<CollectionState>,
    metadata: RwLock<Metadata>,
}

impl Collection {
    /// Create a new [`CollectionBuilder`].
    pub fn builder() -> CollectionBuilder {
        CollectionBuilder::default()
    }

    /// The collection name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Return a reference to the collection configuration.
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// The segmenter derived from the configured chunk size and overlap.
    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    /// The embedding dimensionality, once the first document has been embedded.
    pub async fn dimensions(&self) -> Option<usize> {
        self.state.read().await.dimensions
    }

    /// A snapshot of the collection-level metadata.
    pub async fn metadata(&self) -> Metadata {
        self.metadata.read().await.clone()
    }

    /// Set a collection-level metadata entry, returning the previous value.
    pub async fn set_metadata(
        &self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Option<MetadataValue> {
        self.metadata.write().await.insert(key.into(), value.into())
    }

    /// Segment `content` and embed every segment in one batch.
    ///
    /// Runs without holding any lock.
    async fn embed_content(&self, content: &str) -> Result<Vec<Segment>> {
        let texts = self.segmenter.split(content);
        let embeddings =
            self.embedding_function.embed(&texts, &self.config.document_purpose).await?;
        if embeddings.len() != texts.len() {
            return Err(VectorError::EmbeddingCountMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            });
        }

        let mut segments: Vec<Segment> = Vec::with_capacity(texts.len());
        for (text, embedding) in texts.into_iter().zip(embeddings) {
            if let Some(first) = segments.first().map(|s| s.embedding.len()) {
                if embedding.len() != first {
                    return Err(VectorError::DimensionMismatch {
                        expected: first,
                        actual: embedding.len(),
                    });
                }
            }
            segments.push(Segment { text, embedding: normalize(&embedding)? });
        }
        Ok(segments)
    }

    /// Add a new document: segment → embed → store.
    ///
    /// Any segments already on `document` are replaced.
    ///
    /// # Errors
    ///
    /// - [`VectorError::Validation`] if the ID or content is empty
    /// - [`VectorError::DuplicateId`] if the ID is already stored
    /// - [`VectorError::ZeroVector`] if a returned embedding has zero magnitude
    /// - [`VectorError::NonFinite`] if a returned embedding has a NaN or infinite component
    /// - [`VectorError::EmbeddingCountMismatch`] if the embedding function returns
    ///   a different number of vectors than segments
    /// - [`VectorError::DimensionMismatch`] if the embeddings do not match the
    ///   collection's dimensionality
    /// - any error returned by the embedding function, unchanged
    pub async fn add_document(&self, mut document: Document) -> Result<()> {
        validate_document(&document)?;

        // Fail fast before paying for the embedding round trip.
        if self.state.read().await.documents.contains_key(&document.id) {
            return Err(VectorError::DuplicateId(document.id));
        }

        let segments = self.embed_content(&document.content).await.map_err(|e| {
            error!(
                document.id = %document.id,
                error = %e,
                "embedding failed while adding document"
            );
            e
        })?;
        let segment_count = segments.len();
        document.set_segments(segments);

        let mut state = self.state.write().await;
        if state.documents.contains_key(&document.id) {
            return Err(VectorError::DuplicateId(document.id));
        }
        state.check_dimensions(document.segments()).map_err(|e| {
            error!(document.id = %document.id, error = %e, "rejected document while adding");
            e
        })?;
        info!(
            collection = %self.config.name,
            document.id = %document.id,
            segment_count,
            "added document"
        );
        state.documents.insert(document.id.clone(), Arc::new(document));
        Ok(())
    }

    /// Return a copy of the stored document, or `None` if it is not stored.
    pub async fn get_document(&self, id: &str) -> Option<Document> {
        self.state.read().await.documents.get(id).map(|doc| Document::clone(doc))
    }

    /// Return a copy of every stored document, keyed by ID.
    pub async fn get_documents(&self) -> HashMap<String, Document> {
        self.state
            .read()
            .await
            .documents
            .iter()
            .map(|(id, doc)| (id.clone(), Document::clone(doc)))
            .collect()
    }

    /// Replace a stored document.
    ///
    /// If the content changed, the new content is segmented and embedded and
    /// the fresh segments are committed together with the document. If it is
    /// unchanged, the stored segments are kept and only the metadata is
    /// replaced.
    ///
    /// # Errors
    ///
    /// - [`VectorError::Validation`] if the ID or content is empty
    /// - [`VectorError::NotFound`] if no document with the ID is stored
    /// - the embedding errors listed on [`add_document`](Self::add_document)
    pub async fn update_document(&self, mut document: Document) -> Result<()> {
        validate_document(&document)?;

        let existing = self
            .state
            .read()
            .await
            .documents
            .get(&document.id)
            .cloned()
            .ok_or_else(|| VectorError::NotFound(document.id.clone()))?;

        let reembedded = existing.content != document.content;
        if reembedded {
            let segments = self.embed_content(&document.content).await.map_err(|e| {
                error!(
                    document.id = %document.id,
                    error = %e,
                    "embedding failed while updating document"
                );
                e
            })?;
            document.set_segments(segments);
        } else {
            document.set_segments(existing.segments().to_vec());
        }

        let mut state = self.state.write().await;
        if !state.documents.contains_key(&document.id) {
            return Err(VectorError::NotFound(document.id));
        }
        state.check_dimensions(document.segments()).map_err(|e| {
            error!(document.id = %document.id, error = %e, "rejected document while updating");
            e
        })?;
        info!(
            collection = %self.config.name,
            document.id = %document.id,
            segment_count = document.segments().len(),
            reembedded,
            "updated document"
        );
        state.documents.insert(document.id.clone(), Arc::new(document));
        Ok(())
    }

    /// Remove a document.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::NotFound`] if no document with the ID is stored.
    pub async fn delete_document(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if state.documents.remove(id).is_none() {
            return Err(VectorError::NotFound(id.to_string()));
        }
        info!(collection = %self.config.name, document.id = id, "deleted document");
        Ok(())
    }

    /// Re-segment and re-embed every stored document.
    ///
    /// Documents are processed one at a time in ascending ID order and each
    /// is committed as soon as it is embedded. A document that was updated or
    /// deleted while its embeddings were being generated keeps its newer state.
    ///
    /// # Errors
    ///
    /// Stops at the first document that fails and returns its error. Documents
    /// processed before it stay re-embedded.
    pub async fn embed_documents(&self) -> Result<()> {
        let mut snapshot: Vec<Arc<Document>> =
            self.state.read().await.documents.values().cloned().collect();
        snapshot.sort_by(|a, b| a.id.cmp(&b.id));

        for original in snapshot {
            let segments = self.embed_content(&original.content).await.map_err(|e| {
                error!(
                    document.id = %original.id,
                    error = %e,
                    "embedding failed while re-embedding collection"
                );
                e
            })?;

            let mut state = self.state.write().await;
            let unchanged =
                state.documents.get(&original.id).is_some_and(|doc| Arc::ptr_eq(doc, &original));
            if !unchanged {
                debug!(document.id = %original.id, "document changed while re-embedding, skipping");
                continue;
            }
            state.check_dimensions(&segments).map_err(|e| {
                error!(
                    document.id = %original.id,
                    error = %e,
                    "rejected document while re-embedding collection"
                );
                e
            })?;

            let mut document = Document::clone(&original);
            document.set_segments(segments);
            state.documents.insert(document.id.clone(), Arc::new(document));
        }

        info!(collection = %self.config.name, "re-embedded all documents");
        Ok(())
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.state.read().await.documents.len()
    }

    /// Whether the collection holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.documents.is_empty()
    }
}

fn validate_document(document: &Document) -> Result<()> {
    if document.id.is_empty() {
        return Err(VectorError::Validation("document ID is required".to_string()));
    }
    if document.content.is_empty() {
        return Err(VectorError::Validation(format!(
            "content is required for document '{}'",
            document.id
        )));
    }
    Ok(())
}

/// Builder for constructing a [`Collection`].
///
/// Both the config and the embedding function are required.
///
/// # Example
///
/// ```rust,ignore
/// let collection = Collection::builder()
///     .config(CollectionConfig::default())
///     .embedding_function(Arc::new(embedder))
///     .build()?;
/// ```
#[derive(Default)]
pub struct CollectionBuilder {
    config: Option<CollectionConfig>,
    embedding_function: Option<Arc<dyn EmbeddingFunction>>,
    metadata: Metadata,
}

impl CollectionBuilder {
    /// Set the collection configuration.
    pub fn config(mut self, config: CollectionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding function.
    pub fn embedding_function(mut self, function: Arc<dyn EmbeddingFunction>) -> Self {
        self.embedding_function = Some(function);
        self
    }

    /// Set the initial collection-level metadata.
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Build the [`Collection`].
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::Validation`] if a required part is missing or
    /// the config is inconsistent.
    pub fn build(self) -> Result<Collection> {
        let config = self
            .config
            .ok_or_else(|| VectorError::Validation("config is required".to_string()))?;
        config.validate()?;
        let embedding_function = self.embedding_function.ok_or_else(|| {
            VectorError::Validation("embedding_function is required".to_string())
        })?;

        Ok(Collection {
            segmenter: Segmenter::new(config.chunk_size, config.chunk_overlap),
            config,
            embedding_function,
            state: RwLock::new(CollectionState::default()),
            metadata: RwLock::new(self.metadata),
        })
    }
}
