//! Configuration for a vector collection.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VectorError};

/// Construction-time parameters of a [`Collection`](crate::Collection).
///
/// All fields are immutable once the collection has been built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionConfig {
    /// Name of the collection.
    pub name: String,
    /// Purpose tag passed to the embedding function when embedding document segments.
    pub document_purpose: String,
    /// Purpose tag passed to the embedding function when embedding queries.
    pub query_purpose: String,
    /// Maximum segment length in characters (Unicode code points).
    pub chunk_size: usize,
    /// Number of characters shared by consecutive segments.
    pub chunk_overlap: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            document_purpose: "document".to_string(),
            query_purpose: "query".to_string(),
            chunk_size: 512,
            chunk_overlap: 100,
        }
    }
}

impl CollectionConfig {
    /// Create a new builder for constructing a [`CollectionConfig`].
    pub fn builder() -> CollectionConfigBuilder {
        CollectionConfigBuilder::default()
    }

    /// Check that the parameters are consistent.
    ///
    /// Configs produced by [`CollectionConfigBuilder::build`] are already
    /// valid; call this on configs obtained through deserialization.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::Validation`] if:
    /// - `name`, `document_purpose` or `query_purpose` is empty
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(VectorError::Validation("collection name is required".to_string()));
        }
        if self.document_purpose.is_empty() {
            return Err(VectorError::Validation("document purpose tag is required".to_string()));
        }
        if self.query_purpose.is_empty() {
            return Err(VectorError::Validation("query purpose tag is required".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(VectorError::Validation(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(VectorError::Validation(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`CollectionConfig`].
#[derive(Debug, Clone, Default)]
pub struct CollectionConfigBuilder {
    config: CollectionConfig,
}

impl CollectionConfigBuilder {
    /// Set the collection name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the purpose tag used when embedding document segments.
    pub fn document_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.config.document_purpose = purpose.into();
        self
    }

    /// Set the purpose tag used when embedding queries.
    pub fn query_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.config.query_purpose = purpose.into();
        self
    }

    /// Set the maximum segment length in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive segments in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Build the [`CollectionConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::Validation`] under the conditions listed on
    /// [`CollectionConfig::validate`].
    pub fn build(self) -> Result<CollectionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
