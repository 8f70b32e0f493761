//! Property tests for fixed-size segmentation.

use adk_vector::Segmenter;
use proptest::prelude::*;

/// Generate a valid `(chunk_size, chunk_overlap)` pair.
fn arb_params() -> impl Strategy<Value = (usize, usize)> {
    (1usize..40).prop_flat_map(|size| (Just(size), 0..size))
}

/// *For any* text and valid parameters, the windows SHALL cover every
/// character without gaps, start at multiples of the stride, and number
/// `ceil(len / stride)`.
mod prop_segmenter_coverage {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn windows_cover_text_without_gaps(
            text in "\\PC{0,200}",
            (size, overlap) in arb_params(),
        ) {
            let segmenter = Segmenter::new(size, overlap);
            let chars: Vec<char> = text.chars().collect();
            let len = chars.len();
            let stride = size - overlap;
            let windows = segmenter.windows(len);

            prop_assert_eq!(windows.len(), len.div_ceil(stride));

            let mut covered = 0;
            for (i, &(start, end)) in windows.iter().enumerate() {
                prop_assert_eq!(start, i * stride);
                prop_assert!(start <= covered, "gap before window {}", i);
                prop_assert!(end - start <= size);
                prop_assert!(end <= len);
                covered = covered.max(end);
            }
            prop_assert_eq!(covered, len);

            let segments = segmenter.split(&text);
            prop_assert_eq!(segments.len(), windows.len());
            for (segment, &(start, end)) in segments.iter().zip(&windows) {
                let expected: String = chars[start..end].iter().collect();
                prop_assert_eq!(segment, &expected);
            }
        }

        #[test]
        fn split_is_deterministic(
            text in "\\PC{0,200}",
            (size, overlap) in arb_params(),
        ) {
            let segmenter = Segmenter::new(size, overlap);
            prop_assert_eq!(segmenter.split(&text), segmenter.split(&text));
        }
    }
}

#[test]
fn chunk_100_overlap_10_starts_at_0_90_180() {
    let segmenter = Segmenter::new(100, 10);
    let starts: Vec<usize> = segmenter.windows(250).into_iter().map(|(s, _)| s).collect();
    assert_eq!(starts, vec![0, 90, 180]);
}

#[test]
fn multibyte_text_splits_on_code_points() {
    let segmenter = Segmenter::new(3, 1);
    assert_eq!(segmenter.split("日本語のテキスト"), vec!["日本語", "語のテ", "テキス", "スト"]);
}
