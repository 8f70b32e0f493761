//! Parallel top-N similarity ranking.

use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::warn;

use crate::error::{Result, VectorError};
use crate::vector::{dot_product, normalize};

/// Smallest number of candidates a rayon task scores on its own.
const MIN_CANDIDATES_PER_TASK: usize = 256;

/// A candidate identifier paired with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Similarity {
    /// The candidate identifier.
    pub id: String,
    /// Dot product of the normalized query and the candidate vector.
    pub score: f32,
}

/// Ranking order: descending score, then ascending identifier.
pub(crate) fn by_score_then_id(a_score: f32, a_id: &str, b_score: f32, b_id: &str) -> Ordering {
    b_score.total_cmp(&a_score).then_with(|| a_id.cmp(b_id))
}

/// Return the `n` candidates most similar to `query`, best first.
///
/// `query` is normalized here; candidate vectors are expected to be unit
/// length already, so each score is a cosine similarity. Candidates are scored
/// in parallel into a buffer indexed by candidate position, then ordered by
/// descending score with ties broken by ascending identifier. A candidate whose
/// dimensionality differs from the query, or whose score is NaN or infinite,
/// is logged and skipped.
///
/// # Errors
///
/// Returns [`VectorError::EmptyInput`] if `candidates` is empty,
/// [`VectorError::DimensionMismatch`] if the first candidate's dimensionality
/// differs from the query's, and the errors of [`normalize`] for the query.
pub fn top_n<I, V>(query: &[f32], candidates: &[(I, V)], n: usize) -> Result<Vec<Similarity>>
where
    I: AsRef<str> + Sync,
    V: AsRef<[f32]> + Sync,
{
    let (_, first) =
        candidates.first().ok_or_else(|| VectorError::EmptyInput("no candidates".to_string()))?;
    let first: &[f32] = first.as_ref();
    if query.len() != first.len() {
        return Err(VectorError::DimensionMismatch { expected: first.len(), actual: query.len() });
    }

    let query = normalize(query)?;

    let scores: Vec<Option<f32>> = candidates
        .par_iter()
        .with_min_len(MIN_CANDIDATES_PER_TASK)
        .map(|(id, embedding)| {
            let embedding: &[f32] = embedding.as_ref();
            match dot_product(&query, embedding) {
                Ok(score) if score.is_finite() => Some(score),
                Ok(score) => {
                    let id: &str = id.as_ref();
                    warn!(candidate = id, score, "skipping candidate with non-finite score");
                    None
                }
                Err(e) => {
                    let id: &str = id.as_ref();
                    warn!(candidate = id, error = %e, "skipping candidate");
                    None
                }
            }
        })
        .collect();

    let mut similarities: Vec<Similarity> = candidates
        .iter()
        .zip(scores)
        .filter_map(|((id, _), score)| {
            let id: &str = id.as_ref();
            score.map(|score| Similarity { id: id.to_string(), score })
        })
        .collect();

    let cmp = |a: &Similarity, b: &Similarity| by_score_then_id(a.score, &a.id, b.score, &b.id);
    if n == 0 {
        return Ok(Vec::new());
    }
    if n < similarities.len() {
        similarities.select_nth_unstable_by(n - 1, cmp);
        similarities.truncate(n);
    }
    similarities.sort_by(cmp);

    Ok(similarities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_candidates() {
        let candidates = vec![("doc1", vec![0.6f32, 0.8]), ("doc2", vec![0.8f32, 0.6])];
        let top = top_n(&[0.6, 0.8], &candidates, 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, "doc1");
        assert!((top[0].score - 1.0).abs() < 1e-6);
        assert_eq!(top[1].id, "doc2");
        assert!((top[1].score - 0.96).abs() < 1e-6);
    }

    #[test]
    fn test_truncates_to_n() {
        let candidates =
            vec![("a", vec![1.0f32, 0.0]), ("b", vec![0.0f32, 1.0]), ("c", vec![0.6f32, 0.8])];
        let top = top_n(&[1.0, 0.0], &candidates, 2).unwrap();
        let ids: Vec<&str> = top.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_n_larger_than_candidates() {
        let candidates = vec![("a", vec![1.0f32])];
        assert_eq!(top_n(&[2.0], &candidates, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_zero_n() {
        let candidates = vec![("a", vec![1.0f32])];
        assert!(top_n(&[1.0], &candidates, 0).unwrap().is_empty());
    }

    #[test]
    fn test_ties_broken_by_id() {
        let candidates =
            vec![("c", vec![1.0f32, 0.0]), ("a", vec![1.0f32, 0.0]), ("b", vec![1.0f32, 0.0])];
        let top = top_n(&[1.0, 0.0], &candidates, 2).unwrap();
        let ids: Vec<&str> = top.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_candidates() {
        let candidates: Vec<(&str, Vec<f32>)> = Vec::new();
        assert!(matches!(top_n(&[1.0], &candidates, 1), Err(VectorError::EmptyInput(_))));
    }

    #[test]
    fn test_first_candidate_mismatch_fails() {
        let candidates = vec![("a", vec![1.0f32, 0.0, 0.0])];
        assert!(matches!(
            top_n(&[1.0, 0.0], &candidates, 1),
            Err(VectorError::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_later_mismatch_is_skipped() {
        let candidates =
            vec![("a", vec![1.0f32, 0.0]), ("b", vec![1.0f32]), ("c", vec![0.0f32, 1.0])];
        let top = top_n(&[1.0, 0.0], &candidates, 3).unwrap();
        let ids: Vec<&str> = top.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_zero_query() {
        let candidates = vec![("a", vec![1.0f32, 0.0])];
        assert!(matches!(top_n(&[0.0, 0.0], &candidates, 1), Err(VectorError::ZeroVector)));
    }

    #[test]
    fn test_non_finite_candidates_are_skipped() {
        let candidates = vec![
            ("bad", vec![f32::NAN, 0.0]),
            ("good", vec![1.0f32, 0.0]),
            ("huge", vec![f32::INFINITY, 0.0]),
        ];
        let top = top_n(&[1.0, 0.0], &candidates, 1).unwrap();
        assert_eq!(top, vec![Similarity { id: "good".to_string(), score: 1.0 }]);
    }

    #[test]
    fn test_non_finite_query_fails() {
        let candidates = vec![("a", vec![1.0f32, 0.0])];
        assert!(matches!(top_n(&[f32::NAN, 1.0], &candidates, 1), Err(VectorError::NonFinite)));
    }
}
