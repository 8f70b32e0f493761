//! Data types for documents, segments, metadata, and search results.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Key-value metadata attached to a [`Document`].
pub type Metadata = HashMap<String, MetadataValue>;

/// A single metadata value.
///
/// Serialized untagged, so `{"title": "a", "year": 2024, "draft": false}`
/// round-trips through JSON as plain values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetadataValue {
    /// A string value.
    String(String),
    /// A numeric value.
    Number(f64),
    /// A boolean value.
    Bool(bool),
    /// A nested map.
    Map(Metadata),
}

impl MetadataValue {
    /// Return the string value, if this is a [`MetadataValue::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Return the numeric value, if this is a [`MetadataValue::Number`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Return the boolean value, if this is a [`MetadataValue::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Return the nested map, if this is a [`MetadataValue::Map`].
    pub fn as_map(&self) -> Option<&Metadata> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl std::fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Map(m) => {
                let mut keys: Vec<&String> = m.keys().collect();
                keys.sort();
                f.write_str("{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {}", m[key])?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Metadata> for MetadataValue {
    fn from(value: Metadata) -> Self {
        Self::Map(value)
    }
}

/// A contiguous window of a document's content with its embedding.
///
/// The embedding is L2-normalized when the segment is created and is never
/// renormalized afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    /// The text of this window.
    pub text: String,
    /// The unit-length embedding of `text`.
    pub embedding: Vec<f32>,
}

/// A source document with metadata and its embedded segments.
///
/// Segments are produced by the owning [`Collection`](crate::Collection);
/// any segments on a document passed to it are replaced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// Key-value metadata associated with the document.
    #[serde(default)]
    pub metadata: Metadata,
    /// The full original text content.
    pub content: String,
    #[serde(default)]
    segments: Vec<Segment>,
}

impl Document {
    /// Create a document with no metadata.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: Metadata::new(),
            content: content.into(),
            segments: Vec::new(),
        }
    }

    /// Attach metadata, replacing any already set.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Insert a single metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The segments in order of appearance in `content`.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn set_segments(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
    }
}

/// A matched [`Segment`] paired with its similarity score.
///
/// Holds a shared reference to the stored document rather than a copy. The
/// collection replaces documents on mutation instead of editing them in place,
/// so a result keeps describing the document as it was when the search ran.
#[derive(Debug, Clone)]
pub struct SearchResult {
    document: Arc<Document>,
    segment_index: usize,
    score: f32,
}

impl SearchResult {
    /// `segment_index` must be in bounds for `document`.
    pub(crate) fn new(document: Arc<Document>, segment_index: usize, score: f32) -> Self {
        debug_assert!(segment_index < document.segments().len());
        Self { document, segment_index, score }
    }

    /// The document the matched segment belongs to.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The shared handle to the matched document.
    pub fn document_arc(&self) -> &Arc<Document> {
        &self.document
    }

    /// The matched segment.
    pub fn segment(&self) -> &Segment {
        &self.document.segments()[self.segment_index]
    }

    /// Position of the matched segment within its document.
    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    /// The cosine similarity between the query and the segment.
    pub fn score(&self) -> f32 {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_untagged_json() {
        let json = r#"{"title": "a", "year": 2024, "draft": false, "author": {"name": "b"}}"#;
        let metadata: Metadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata["title"].as_str(), Some("a"));
        assert_eq!(metadata["year"].as_f64(), Some(2024.0));
        assert_eq!(metadata["draft"].as_bool(), Some(false));
        assert_eq!(metadata["author"].as_map().unwrap()["name"].as_str(), Some("b"));
    }

    #[test]
    fn test_display_nested_map_sorted() {
        let mut inner = Metadata::new();
        inner.insert("z".to_string(), 1i64.into());
        inner.insert("a".to_string(), true.into());
        assert_eq!(MetadataValue::Map(inner).to_string(), "{a: true, z: 1}");
    }

    #[test]
    fn test_deserialized_document_has_no_segments() {
        let doc: Document = serde_json::from_str(r#"{"id": "d", "content": "text"}"#).unwrap();
        assert!(doc.segments().is_empty());
        assert!(doc.metadata.is_empty());
    }
}
