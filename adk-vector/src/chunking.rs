//! Fixed-size overlapping text segmentation.

/// Splits text into fixed-size windows of Unicode code points with overlap.
///
/// Windows start at `0, stride, 2 * stride, …` where
/// `stride = chunk_size - chunk_overlap`, and continue while the start lies
/// inside the text. Every character is covered by at least one window and the
/// last window may be shorter than `chunk_size`. The same text and parameters
/// always produce the same windows.
///
/// # Example
///
/// ```rust,ignore
/// use adk_vector::Segmenter;
///
/// let segmenter = Segmenter::new(100, 10);
/// let segments = segmenter.split(&content);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmenter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Segmenter {
    /// Create a new `Segmenter`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per segment
    /// * `chunk_overlap`: number of characters shared by consecutive segments
    ///
    /// Callers are expected to pass `chunk_overlap < chunk_size`, as
    /// [`CollectionConfig`](crate::CollectionConfig) enforces. Otherwise only
    /// the first window is produced.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Distance between the starts of consecutive windows.
    pub fn stride(&self) -> usize {
        self.chunk_size.saturating_sub(self.chunk_overlap)
    }

    /// Character ranges `[start, end)` of the windows over a text of `len` characters.
    pub fn windows(&self, len: usize) -> Vec<(usize, usize)> {
        let mut windows = Vec::new();
        if self.chunk_size == 0 {
            return windows;
        }

        let step = self.stride();
        let mut start = 0;
        while start < len {
            windows.push((start, (start + self.chunk_size).min(len)));
            if step == 0 {
                break;
            }
            start += step;
        }
        windows
    }

    /// Split `text` into its windows, in order of appearance.
    ///
    /// Returns an empty `Vec` for empty text.
    pub fn split(&self, text: &str) -> Vec<String> {
        // Byte offset of every char boundary, including the end of the text.
        let offsets: Vec<usize> =
            text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let len = offsets.len() - 1;

        self.windows(len)
            .into_iter()
            .map(|(start, end)| text[offsets[start]..offsets[end]].to_string())
            .collect()
    }
}
