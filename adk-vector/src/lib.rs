//! # adk-vector
//!
//! In-memory, segment-level vector similarity search for ADK-Rust.
//!
//! A [`Collection`] stores documents, splits each into overlapping
//! fixed-size segments, attaches embeddings produced by an external
//! [`EmbeddingFunction`], and answers "most similar segments to this query"
//! using cosine similarity over unit-normalized vectors.
//!
//! ## Features
//!
//! - **Deterministic segmentation**: fixed-size character windows with overlap
//! - **Parallel ranking**: candidates are scored on the rayon thread pool
//! - **Multi-query search**: concurrent queries merged with one result per document
//! - **Reproducible ordering**: ties are broken by identifier
//! - **Non-blocking writes**: embeddings are generated outside the collection lock
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use adk_vector::{Collection, CollectionConfig, Document};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let collection = Collection::builder()
//!         .config(CollectionConfig::builder().name("notes").chunk_size(200).chunk_overlap(20).build()?)
//!         .embedding_function(Arc::new(MyEmbedder::new()))
//!         .build()?;
//!
//!     collection.add_document(Document::new("intro", "Rust is a systems language...")).await?;
//!     for result in collection.search("memory safety", 3).await? {
//!         println!("{} ({:.3}): {}", result.document().id, result.score(), result.segment().text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod chunking;
pub mod collection;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod query;
pub mod ranking;
pub mod vector;

pub use aggregate::{Formatter, aggregate_results};
pub use chunking::Segmenter;
pub use collection::{Collection, CollectionBuilder};
pub use config::{CollectionConfig, CollectionConfigBuilder};
pub use document::{Document, Metadata, MetadataValue, SearchResult, Segment};
pub use embedding::EmbeddingFunction;
pub use error::{Result, VectorError};
pub use query::{parse_segment_key, segment_key};
pub use ranking::{Similarity, top_n};
