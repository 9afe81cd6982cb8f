//! Context-window selection.
//!
//! A single extracted sentence can truncate a quotation mid-thought; each
//! accepted candidate therefore pulls in its immediate index neighbors, and
//! the final set is restored to reading order before it is handed to the
//! refinement service.

use quotescout_core::{ScoredSentence, Sentence};
use std::collections::BTreeSet;

/// Expand candidates with their immediate neighbors and return the selected
/// indices in ascending (reading) order.
///
/// Candidates are walked in score-descending order (ties by index ascending);
/// a candidate already selected as a neighbor of a stronger one does not
/// expand again. No index is ever selected twice or outside `[0, total)`.
/// There is no cap on the selection count.
pub fn select_context_windows(candidates: &[ScoredSentence], total: usize) -> Vec<usize> {
    let mut ordered: Vec<&ScoredSentence> = candidates.iter().collect();
    ordered.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.index.cmp(&b.index))
    });

    let mut selected: BTreeSet<usize> = BTreeSet::new();
    for cand in ordered {
        if cand.index >= total || selected.contains(&cand.index) {
            continue;
        }
        selected.insert(cand.index);
        if let Some(prev) = cand.index.checked_sub(1) {
            selected.insert(prev);
        }
        if cand.index + 1 < total {
            selected.insert(cand.index + 1);
        }
    }
    selected.into_iter().collect()
}

/// Join the selected sentences into the candidate text block, in reading
/// order.
pub fn candidate_block(sentences: &[Sentence], indices: &[usize]) -> String {
    let parts: Vec<&str> = indices
        .iter()
        .filter_map(|&i| sentences.get(i).map(|s| s.text.as_str()))
        .collect();
    parts.join(" ")
}
