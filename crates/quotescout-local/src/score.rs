//! Multi-signal relevance scoring.
//!
//! Each sentence gets a composite score from keyword, fuzzy-similarity,
//! exact-match, density, length, and position signals. The weights are the
//! named constants re-exported through [`ScoreConfig`]; scoring logic never
//! carries a literal.

use quotescout_core::{FuzzySearch, ScoreConfig, ScoredSentence, Sentence};

/// Tokenize a topic into keywords: lowercase, split on non-alphanumeric runs,
/// keep tokens longer than two characters.
pub fn topic_keywords(topic: &str) -> Vec<String> {
    topic
        .to_lowercase()
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|t| t.chars().count() > 2)
        .map(|t| t.to_string())
        .collect()
}

/// One scoring pass over the segmented document.
#[derive(Debug, Clone)]
pub struct ScorePass {
    pub sentences: Vec<ScoredSentence>,
    /// Number of sentences the fuzzy matcher reported at all; the early-exit
    /// check needs match existence, not just surviving weights.
    pub fuzzy_matches: usize,
}

impl ScorePass {
    /// A document with no keyword hit anywhere and zero fuzzy matches has no
    /// relevance signal; ranking returns empty without invoking refinement.
    pub fn has_signal(&self) -> bool {
        self.fuzzy_matches > 0 || self.sentences.iter().any(|s| s.keyword_hits > 0)
    }
}

pub fn score_sentences(
    sentences: &[Sentence],
    topic: &str,
    fuzzy: &dyn FuzzySearch,
    cfg: &ScoreConfig,
) -> ScorePass {
    let keywords = topic_keywords(topic);
    let topic_lc = topic.trim().to_lowercase();
    let total = sentences.len().max(1);

    // Fuzzy pass over the whole corpus; invert distance into weight, keep the
    // maximum per sentence when the matcher reports one more than once.
    let corpus: Vec<&str> = sentences.iter().map(|s| s.text.as_str()).collect();
    let hits = fuzzy.search(&corpus, topic);
    let fuzzy_matches = hits.len();
    let mut fuzzy_weight = vec![0.0f64; sentences.len()];
    for hit in hits {
        if let Some(w) = fuzzy_weight.get_mut(hit.index) {
            *w = w.max(1.0 - hit.score.min(1.0));
        }
    }

    let scored = sentences
        .iter()
        .map(|s| {
            let text_lc = s.text.to_lowercase();
            let keyword_hits = keywords
                .iter()
                .filter(|k| text_lc.contains(k.as_str()))
                .count() as u32;
            let exact_topic_match = if !topic_lc.is_empty() && text_lc.contains(&topic_lc) {
                cfg.exact_topic_value
            } else {
                0.0
            };
            let words = s.text.split_whitespace().count().max(1);
            let keyword_density = f64::from(keyword_hits) / words as f64 * cfg.density_scale;
            let chars = s.text.chars().count();
            let length_ok = if (cfg.min_quote_chars..=cfg.max_quote_chars).contains(&chars) {
                1.0
            } else {
                cfg.length_penalty
            };
            let position_weight =
                1.0 - (s.index as f64 / total as f64).min(cfg.position_decay_cap);
            let fw = fuzzy_weight[s.index];

            let score = cfg.w_keyword_hits * f64::from(keyword_hits)
                + cfg.w_fuzzy * fw
                + cfg.w_exact_topic * exact_topic_match
                + cfg.w_density * keyword_density
                + cfg.w_length * length_ok
                + cfg.w_position * position_weight;

            ScoredSentence {
                text: s.text.clone(),
                index: s.index,
                keyword_hits,
                fuzzy_weight: fw,
                exact_topic_match,
                keyword_density,
                length_ok,
                position_weight,
                score,
            }
        })
        .collect();

    ScorePass {
        sentences: scored,
        fuzzy_matches,
    }
}

/// Filter the scored sentences down to the candidate set.
///
/// A sentence qualifies on any of: exact topic match, at least one keyword
/// hit, fuzzy weight at or above the acceptance threshold, or a composite
/// score above the floor. If that yields nothing, relax to any positive
/// score; an empty result after relaxing means no candidates.
pub fn filter_candidates(pass: &ScorePass, cfg: &ScoreConfig) -> Vec<ScoredSentence> {
    let strict: Vec<ScoredSentence> = pass
        .sentences
        .iter()
        .filter(|s| {
            s.exact_topic_match > 0.0
                || s.keyword_hits > 0
                || s.fuzzy_weight >= cfg.fuzzy_accept_weight
                || s.score > cfg.score_floor
        })
        .cloned()
        .collect();
    if !strict.is_empty() {
        return strict;
    }
    pass.sentences
        .iter()
        .filter(|s| s.score > 0.0)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy::EditDistanceSearch;
    use quotescout_core::FUZZY_DISTANCE_CUTOFF;

    fn sentences_from(texts: &[&str]) -> Vec<Sentence> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| Sentence {
                text: text.to_string(),
                index,
            })
            .collect()
    }

    fn default_pass(texts: &[&str], topic: &str) -> ScorePass {
        let fuzzy = EditDistanceSearch::new(FUZZY_DISTANCE_CUTOFF).unwrap();
        score_sentences(&sentences_from(texts), topic, &fuzzy, &ScoreConfig::default())
    }

    #[test]
    fn topic_keywords_lowercase_and_drop_short_tokens() {
        let kw = topic_keywords("The Rise of AI-Driven Policy");
        assert_eq!(kw, vec!["the", "rise", "driven", "policy"]);
    }

    #[test]
    fn exact_topic_match_outranks_fuzzy_overlap() {
        let mut texts = vec!["The new climate policy was announced today."];
        let filler =
            "Completely unrelated filler content about gardening tools and weekend plans.";
        for _ in 0..40 {
            texts.push(filler);
        }
        // A near-miss that only fuzzy matching can reward.
        texts.push("The new climbing police were announced yesterday evening.");

        let pass = default_pass(&texts, "climate policy");
        let exact = &pass.sentences[0];
        assert_eq!(exact.exact_topic_match, 2.0);
        assert!(exact.keyword_hits >= 2);

        let best_non_exact = pass.sentences[1..]
            .iter()
            .map(|s| s.score)
            .fold(f64::MIN, f64::max);
        assert!(
            exact.score > best_non_exact,
            "exact match {} must beat fuzzy-only {}",
            exact.score,
            best_non_exact
        );
    }

    #[test]
    fn no_signal_when_nothing_overlaps() {
        let pass = default_pass(
            &["Bananas are rich in potassium and flavor."],
            "quantum chromodynamics",
        );
        assert!(!pass.has_signal());
    }

    #[test]
    fn keyword_hits_alone_are_a_signal() {
        let pass = default_pass(
            &["The committee debated the policy for hours on end."],
            "hydrogen policy subsidies",
        );
        assert!(pass.has_signal());
        let candidates = filter_candidates(&pass, &ScoreConfig::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].keyword_hits, 1);
    }

    #[test]
    fn position_weight_decays_with_floor() {
        let texts: Vec<String> = (0..10)
            .map(|i| format!("Sentence number {i} mentions policy details at length."))
            .collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let pass = default_pass(&refs, "policy");
        let first = pass.sentences.first().unwrap().position_weight;
        let last = pass.sentences.last().unwrap().position_weight;
        assert!(first > last);
        assert!(last >= 1.0 - quotescout_core::POSITION_DECAY_CAP - 1e-9);
    }

    #[test]
    fn length_penalty_applies_outside_band() {
        let long = "policy ".repeat(120);
        let pass = default_pass(&[long.trim()], "policy");
        assert_eq!(pass.sentences[0].length_ok, quotescout_core::LENGTH_PENALTY);
    }

    #[test]
    fn relaxed_filter_keeps_positive_scores_when_strict_is_empty() {
        // Build a pass by hand: no hits, tiny positive score from ambient
        // length/position terms only.
        let pass = ScorePass {
            sentences: vec![ScoredSentence {
                text: "A sentence with faint ambient score only.".to_string(),
                index: 0,
                keyword_hits: 0,
                fuzzy_weight: 0.1,
                exact_topic_match: 0.0,
                keyword_density: 0.0,
                length_ok: 1.0,
                position_weight: 1.0,
                score: 0.55,
            }],
            fuzzy_matches: 1,
        };
        let out = filter_candidates(&pass, &ScoreConfig::default());
        assert_eq!(out.len(), 1, "relaxation should keep score > 0");
    }
}
