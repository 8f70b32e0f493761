//! Shared test doubles for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use adk_vector::{Collection, CollectionConfig, EmbeddingFunction, Result, VectorError};
use async_trait::async_trait;
use tokio::sync::Notify;

/// Deterministic embedding function.
///
/// Texts registered with [`MockEmbedder::with`] get their fixed vector; any
/// other text gets a hash-derived vector. Texts containing `FAIL`, or texts
/// passed to [`MockEmbedder::refuse`], make the whole batch fail. Every call
/// is recorded as `(texts, purpose)`.
pub struct MockEmbedder {
    dimensions: usize,
    fixed: HashMap<String, Vec<f32>>,
    refused: Mutex<Vec<String>>,
    calls: Mutex<Vec<(Vec<String>, String)>>,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            fixed: HashMap::new(),
            refused: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, text: &str, embedding: Vec<f32>) -> Self {
        self.fixed.insert(text.to_string(), embedding);
        self
    }

    pub fn refuse(&self, text: &str) {
        self.refused.lock().unwrap().push(text.to_string());
    }

    pub fn calls(&self) -> Vec<(Vec<String>, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn hashed(&self, text: &str) -> Vec<f32> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        (0..self.dimensions)
            .map(|i| ((hash.wrapping_add(i as u64)) as f32).sin() + 1.5)
            .collect()
    }
}

#[async_trait]
impl EmbeddingFunction for MockEmbedder {
    async fn embed(&self, texts: &[String], purpose: &str) -> Result<Vec<Vec<f32>>> {
        self.calls.lock().unwrap().push((texts.to_vec(), purpose.to_string()));
        let refused = self.refused.lock().unwrap().clone();
        if texts.iter().any(|t| t.contains("FAIL") || refused.contains(t)) {
            return Err(VectorError::Embedding {
                provider: "mock".to_string(),
                message: "refused to embed".to_string(),
            });
        }
        Ok(texts
            .iter()
            .map(|t| self.fixed.get(t).cloned().unwrap_or_else(|| self.hashed(t)))
            .collect())
    }
}

/// Embedding function that always returns no vectors.
pub struct EmptyEmbedder;

#[async_trait]
impl EmbeddingFunction for EmptyEmbedder {
    async fn embed(&self, _texts: &[String], _purpose: &str) -> Result<Vec<Vec<f32>>> {
        Ok(Vec::new())
    }
}

/// Embedding function that returns one vector fewer than it was given texts.
pub struct MiscountingEmbedder;

#[async_trait]
impl EmbeddingFunction for MiscountingEmbedder {
    async fn embed(&self, texts: &[String], _purpose: &str) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect())
    }
}

/// Wraps [`MockEmbedder`] and parks any batch containing the held text.
///
/// The parked call signals `entered` and waits for `release` before
/// delegating, so a test can interleave other operations with it.
pub struct GatedEmbedder {
    inner: MockEmbedder,
    held: Mutex<Option<String>>,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedEmbedder {
    pub fn new(inner: MockEmbedder) -> Self {
        Self { inner, held: Mutex::new(None), entered: Notify::new(), release: Notify::new() }
    }

    pub fn hold(&self, text: &str) {
        *self.held.lock().unwrap() = Some(text.to_string());
    }
}

#[async_trait]
impl EmbeddingFunction for GatedEmbedder {
    async fn embed(&self, texts: &[String], purpose: &str) -> Result<Vec<Vec<f32>>> {
        let held = self.held.lock().unwrap().clone();
        if held.is_some_and(|held| texts.contains(&held)) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.embed(texts, purpose).await
    }
}

pub fn config(chunk_size: usize, chunk_overlap: usize) -> CollectionConfig {
    CollectionConfig::builder()
        .name("test")
        .document_purpose("search_document")
        .query_purpose("search_query")
        .chunk_size(chunk_size)
        .chunk_overlap(chunk_overlap)
        .build()
        .unwrap()
}

pub fn collection(
    chunk_size: usize,
    chunk_overlap: usize,
    embedder: Arc<dyn EmbeddingFunction>,
) -> Collection {
    Collection::builder()
        .config(config(chunk_size, chunk_overlap))
        .embedding_function(embedder)
        .build()
        .unwrap()
}

/// Route `tracing` output through the test harness so warnings show on failure.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
