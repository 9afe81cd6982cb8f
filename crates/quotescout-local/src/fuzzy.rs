//! Approximate topic-to-sentence matching.
//!
//! This is intentionally self-contained (no external index crate): a bounded
//! edit-distance substring matcher in the style of approximate full-text
//! search libraries. The native score follows their convention (lower is
//! better); the scorer owns the inversion into a 0..1 weight.

use quotescout_core::{Error, FuzzyHit, FuzzySearch, Result};

#[derive(Debug, Clone)]
pub struct EditDistanceSearch {
    /// Normalized distance above which a match is not reported.
    cutoff: f64,
}

impl EditDistanceSearch {
    /// Build a matcher with the given normalized-distance cutoff.
    ///
    /// The cutoff must be in `(0, 1]`; a zero or out-of-range value would
    /// silently disable fuzzy matching, so it is rejected up front.
    pub fn new(cutoff: f64) -> Result<Self> {
        if !(cutoff > 0.0 && cutoff <= 1.0) {
            return Err(Error::NotConfigured(format!(
                "fuzzy distance cutoff must be in (0, 1], got {cutoff}"
            )));
        }
        Ok(Self { cutoff })
    }
}

impl FuzzySearch for EditDistanceSearch {
    fn search(&self, corpus: &[&str], query: &str) -> Vec<FuzzyHit> {
        let pattern: Vec<char> = query.trim().to_lowercase().chars().collect();
        if pattern.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for (index, item) in corpus.iter().enumerate() {
            let text: Vec<char> = item.to_lowercase().chars().collect();
            let dist = substring_edit_distance(&pattern, &text);
            let score = (dist as f64 / pattern.len() as f64).min(1.0);
            if score <= self.cutoff {
                hits.push(FuzzyHit { index, score });
            }
        }
        hits
    }
}

/// Minimum edit distance between `pattern` and any substring of `text`.
///
/// Standard approximate-substring DP: the first row is zero (a match may
/// begin anywhere), and the answer is the minimum of the final row (it may
/// end anywhere). O(|pattern| * |text|) time, O(|text|) space.
fn substring_edit_distance(pattern: &[char], text: &[char]) -> usize {
    let m = pattern.len();
    let n = text.len();
    if m == 0 {
        return 0;
    }
    if n == 0 {
        return m;
    }

    let mut prev = vec![0usize; n + 1];
    let mut cur = vec![0usize; n + 1];
    for i in 1..=m {
        cur[0] = i;
        for j in 1..=n {
            let cost = usize::from(pattern[i - 1] != text[j - 1]);
            cur[j] = (prev[j - 1] + cost).min(prev[j] + 1).min(cur[j - 1] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev.into_iter().skip(1).min().unwrap_or(m)
}
