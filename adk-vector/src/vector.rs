//! Vector math over embedding vectors.
//!
//! Stored embeddings are normalized once, at ingestion, and trusted from then
//! on. [`dot_product`] of two unit vectors is their cosine similarity, which is
//! what the ranking hot path uses.

use crate::error::{Result, VectorError};

/// Tolerance used by [`is_normalized`].
pub const NORMALIZED_TOLERANCE: f32 = 1e-5;

/// Largest absolute component, or an error if any component is NaN or infinite.
fn max_abs(v: &[f32]) -> Result<f32> {
    let mut max = 0.0f32;
    for x in v {
        if !x.is_finite() {
            return Err(VectorError::NonFinite);
        }
        max = max.max(x.abs());
    }
    Ok(max)
}

/// Scale `v` to unit L2 length.
///
/// Components are divided by the largest magnitude before squaring, so very
/// large or very small (but non-zero) vectors normalize without overflow or
/// underflow.
///
/// # Errors
///
/// Returns [`VectorError::NonFinite`] if any component is NaN or infinite and
/// [`VectorError::ZeroVector`] if `v` has zero magnitude (including the empty
/// vector).
pub fn normalize(v: &[f32]) -> Result<Vec<f32>> {
    let scale = max_abs(v)?;
    if scale == 0.0 {
        return Err(VectorError::ZeroVector);
    }
    let norm = v.iter().map(|x| (x / scale) * (x / scale)).sum::<f32>().sqrt();
    Ok(v.iter().map(|x| (x / scale) / norm).collect())
}

/// Sum of the element-wise products of `a` and `b`.
///
/// # Errors
///
/// Returns [`VectorError::DimensionMismatch`] if the lengths differ.
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(VectorError::DimensionMismatch { expected: a.len(), actual: b.len() });
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

/// Element-wise mean of `vectors`.
///
/// # Errors
///
/// Returns [`VectorError::EmptyInput`] if `vectors` is empty and
/// [`VectorError::DimensionMismatch`] if the vectors differ in length.
pub fn average(vectors: &[Vec<f32>]) -> Result<Vec<f32>> {
    let first = vectors
        .first()
        .ok_or_else(|| VectorError::EmptyInput("no vectors to average".to_string()))?;
    let mut avg = vec![0.0f32; first.len()];
    for vector in vectors {
        if vector.len() != avg.len() {
            return Err(VectorError::DimensionMismatch {
                expected: avg.len(),
                actual: vector.len(),
            });
        }
        for (acc, x) in avg.iter_mut().zip(vector) {
            *acc += x;
        }
    }
    let count = vectors.len() as f32;
    avg.iter_mut().for_each(|x| *x /= count);
    Ok(avg)
}

/// Cosine similarity of two vectors that are not assumed to be normalized.
///
/// # Errors
///
/// Returns [`VectorError::DimensionMismatch`] if the lengths differ and the
/// errors of [`normalize`] for either vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(VectorError::DimensionMismatch { expected: a.len(), actual: b.len() });
    }
    dot_product(&normalize(a)?, &normalize(b)?)
}

/// Whether `v` has unit length within [`NORMALIZED_TOLERANCE`].
///
/// Diagnostic only; the empty vector is never normalized.
pub fn is_normalized(v: &[f32]) -> bool {
    if v.is_empty() {
        return false;
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    (norm - 1.0).abs() < NORMALIZED_TOLERANCE
}
