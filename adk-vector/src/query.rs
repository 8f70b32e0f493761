//! Single- and multi-query top-N retrieval over a [`Collection`].

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::collection::Collection;
use crate::document::{Document, SearchResult};
use crate::error::{Result, VectorError};
use crate::ranking::{by_score_then_id, top_n};

/// Build the ranking key `"{document_id}_{segment_index}"` for a segment.
pub fn segment_key(document_id: &str, segment_index: usize) -> String {
    format!("{document_id}_{segment_index}")
}

/// Split a key built by [`segment_key`] back into document ID and segment index.
///
/// Splits on the last underscore, so document IDs may themselves contain
/// underscores. Returns `None` if there is no underscore or the suffix is not
/// a non-negative integer.
pub fn parse_segment_key(key: &str) -> Option<(&str, usize)> {
    let (document_id, index) = key.rsplit_once('_')?;
    Some((document_id, index.parse().ok()?))
}

impl Collection {
    /// Return the `n` stored segments most similar to `query`, best first.
    ///
    /// The query is embedded with the configured query purpose and ranked
    /// against every stored segment. Ties are ordered by document ID, then
    /// segment index. An empty collection yields no results.
    ///
    /// # Errors
    ///
    /// - [`VectorError::EmptyEmbedding`] if the embedding function returns no vectors
    /// - [`VectorError::DimensionMismatch`] if the query embedding's width
    ///   differs from the stored segments'
    /// - [`VectorError::ZeroVector`] if the query embedding has zero magnitude
    /// - [`VectorError::NonFinite`] if the query embedding has a NaN or infinite component
    /// - any error returned by the embedding function, unchanged
    pub async fn search(&self, query: &str, n: usize) -> Result<Vec<SearchResult>> {
        let query_embedding = self
            .embedding_function
            .embed(&[query.to_string()], &self.config().query_purpose)
            .await?
            .into_iter()
            .next()
            .ok_or(VectorError::EmptyEmbedding)?;

        let documents: Vec<Arc<Document>> =
            self.state.read().await.documents.values().cloned().collect();
        if documents.iter().all(|doc| doc.segments().is_empty()) {
            debug!(collection = %self.name(), "search over empty collection");
            return Ok(Vec::new());
        }

        let mut results = tokio::task::spawn_blocking(move || {
            rank_segments(&query_embedding, &documents, n)
        })
        .await
        .map_err(|e| VectorError::Task(e.to_string()))??;

        results.sort_by(compare_results);
        debug!(collection = %self.name(), result_count = results.len(), "search completed");
        Ok(results)
    }

    /// Run [`search`](Self::search) for every query concurrently and merge the results.
    ///
    /// Each document appears at most once, with the single best-scoring
    /// segment seen across all queries. Queries that fail are logged and
    /// dropped. The merged results are ordered best first and truncated to `n`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::EmptyInput`] if `queries` is empty and
    /// [`VectorError::AllQueriesFailed`] if every query failed.
    pub async fn search_multi<S>(&self, queries: &[S], n: usize) -> Result<Vec<SearchResult>>
    where
        S: AsRef<str>,
    {
        if queries.is_empty() {
            return Err(VectorError::EmptyInput("no queries".to_string()));
        }

        let outcomes = join_all(queries.iter().map(|query| self.search(query.as_ref(), n))).await;

        let mut failed = 0;
        let mut best: HashMap<String, SearchResult> = HashMap::new();
        for (query, outcome) in queries.iter().zip(outcomes) {
            let results = match outcome {
                Ok(results) => results,
                Err(e) => {
                    let query: &str = query.as_ref();
                    warn!(query, error = %e, "query failed");
                    failed += 1;
                    continue;
                }
            };
            for result in results {
                let replace = best
                    .get(&result.document().id)
                    .is_none_or(|existing| is_better(&result, existing));
                if replace {
                    best.insert(result.document().id.clone(), result);
                }
            }
        }

        if failed == queries.len() {
            return Err(VectorError::AllQueriesFailed { count: failed });
        }

        let mut merged: Vec<SearchResult> = best.into_values().collect();
        merged.sort_by(compare_results);
        merged.truncate(n);
        Ok(merged)
    }
}

/// Rank every segment of `documents` against `query` and resolve the winners.
///
/// CPU-bound; runs on the blocking pool over an owned snapshot so neither the
/// collection lock nor a runtime worker is held while scoring.
fn rank_segments(
    query: &[f32],
    documents: &[Arc<Document>],
    n: usize,
) -> Result<Vec<SearchResult>> {
    let candidates: Vec<(String, &[f32])> = documents
        .iter()
        .flat_map(|doc| {
            doc.segments()
                .iter()
                .enumerate()
                .map(move |(i, segment)| (segment_key(&doc.id, i), segment.embedding.as_slice()))
        })
        .collect();

    let similarities = top_n(query, &candidates, n)?;

    let by_id: HashMap<&str, &Arc<Document>> =
        documents.iter().map(|doc| (doc.id.as_str(), doc)).collect();
    let results = similarities
        .par_iter()
        .filter_map(|similarity| {
            let Some((document_id, segment_index)) = parse_segment_key(&similarity.id) else {
                warn!(key = %similarity.id, "failed to parse segment key");
                return None;
            };
            let Some(document) = by_id.get(document_id) else {
                warn!(document.id = document_id, "document not found in collection");
                return None;
            };
            if segment_index >= document.segments().len() {
                warn!(
                    document.id = document_id,
                    segment_index, "segment index out of bounds for document"
                );
                return None;
            }
            Some(SearchResult::new(Arc::clone(document), segment_index, similarity.score))
        })
        .collect();
    Ok(results)
}

/// Higher score wins; on equal scores the earlier segment wins.
fn is_better(candidate: &SearchResult, existing: &SearchResult) -> bool {
    candidate.score() > existing.score()
        || (candidate.score() == existing.score()
            && candidate.segment_index() < existing.segment_index())
}

fn compare_results(a: &SearchResult, b: &SearchResult) -> std::cmp::Ordering {
    by_score_then_id(a.score(), &a.document().id, b.score(), &b.document().id)
        .then_with(|| a.segment_index().cmp(&b.segment_index()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_key_round_trip_with_underscores() {
        let key = segment_key("my_doc_7", 12);
        assert_eq!(key, "my_doc_7_12");
        assert_eq!(parse_segment_key(&key), Some(("my_doc_7", 12)));
    }

    #[test]
    fn test_parse_segment_key_rejects_malformed() {
        assert_eq!(parse_segment_key("nounderscore"), None);
        assert_eq!(parse_segment_key("doc_x"), None);
        assert_eq!(parse_segment_key("doc_-1"), None);
    }
}
