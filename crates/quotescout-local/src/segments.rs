//! Fixed-size chunk windows over cached document content.
//!
//! Segment metadata is computed lazily from the cached text, never stored:
//! the plan is pure arithmetic over the character length, and the slice is
//! taken on demand.

use quotescout_core::SegmentMeta;

/// Default window size in characters. Deployments tune this between 50k and
/// 200k depending on how much a downstream consumer accepts per call.
pub const SEGMENT_SIZE: usize = 100_000;

#[derive(Debug, Clone)]
pub struct SegmentConfig {
    pub segment_size: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            segment_size: SEGMENT_SIZE,
        }
    }
}

/// The ordered segment list covering `[0, total_chars)`.
///
/// Every segment spans exactly `segment_size` characters except possibly the
/// last; windows never overlap and never leave a gap.
pub fn segment_plan(total_chars: usize, segment_size: usize) -> Vec<SegmentMeta> {
    let segment_size = segment_size.max(1);
    let mut out = Vec::new();
    let mut start = 0usize;
    while start < total_chars {
        let end = (start + segment_size).min(total_chars);
        out.push(SegmentMeta {
            index: out.len(),
            start,
            end,
        });
        start = end;
    }
    out
}

/// Slice `[start_char, end_char)` out of `s` by character offsets.
pub fn slice_chars(s: &str, start_char: usize, end_char: usize) -> String {
    if end_char <= start_char {
        return String::new();
    }
    s.chars()
        .skip(start_char)
        .take(end_char - start_char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn one_char_past_the_boundary_yields_a_second_segment() {
        let plan = segment_plan(50_001, 50_000);
        assert_eq!(plan.len(), 2);
        assert_eq!((plan[0].start, plan[0].end), (0, 50_000));
        assert_eq!((plan[1].start, plan[1].end), (50_000, 50_001));
    }

    #[test]
    fn exact_multiple_has_no_empty_tail_segment() {
        let plan = segment_plan(100_000, 50_000);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].end, 100_000);
    }

    #[test]
    fn empty_content_has_no_segments() {
        assert!(segment_plan(0, 50_000).is_empty());
    }

    #[test]
    fn slice_chars_is_offset_by_characters_not_bytes() {
        let s = "héllo wörld";
        assert_eq!(slice_chars(s, 0, 5), "héllo");
        assert_eq!(slice_chars(s, 6, 11), "wörld");
        assert_eq!(slice_chars(s, 4, 4), "");
    }

    proptest! {
        #[test]
        fn concatenated_segments_reconstruct_the_content_exactly(
            content in "[a-zé ]{0,500}",
            segment_size in 1usize..64,
        ) {
            let total = content.chars().count();
            let plan = segment_plan(total, segment_size);
            let mut rebuilt = String::new();
            for seg in &plan {
                prop_assert!(seg.end - seg.start <= segment_size);
                rebuilt.push_str(&slice_chars(&content, seg.start, seg.end));
            }
            prop_assert_eq!(rebuilt, content);
        }

        #[test]
        fn plan_is_contiguous_and_ordered(
            total in 0usize..10_000,
            segment_size in 1usize..512,
        ) {
            let plan = segment_plan(total, segment_size);
            let mut expected_start = 0usize;
            for (i, seg) in plan.iter().enumerate() {
                prop_assert_eq!(seg.index, i);
                prop_assert_eq!(seg.start, expected_start);
                prop_assert!(seg.end > seg.start);
                expected_start = seg.end;
            }
            prop_assert_eq!(expected_start, total);
        }
    }
}
