//! Sentence segmentation: normalized text in, candidate quote units out.

use quotescout_core::Sentence;

/// Split normalized text into sentences at boundaries following `.`, `!` or
/// `?` + whitespace, punctuation kept attached to the preceding sentence.
///
/// Units shorter than `min_chars` (after trimming) are discarded; they are
/// headers, labels, and noise fragments rather than quotable sentences.
/// Indices are dense and renumbered, gaps from discarded units are not
/// preserved.
pub fn split_sentences(text: &str, min_chars: usize) -> Vec<Sentence> {
    let mut out: Vec<Sentence> = Vec::new();
    let mut unit = String::new();

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        unit.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            // Boundary only when followed by whitespace (or end of input), so
            // "v1.2" and "example.com" stay whole.
            let at_boundary = match chars.peek() {
                Some(next) => next.is_whitespace(),
                None => true,
            };
            if at_boundary {
                flush_unit(&mut out, &mut unit, min_chars);
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
            }
        }
    }
    flush_unit(&mut out, &mut unit, min_chars);
    out
}

fn flush_unit(out: &mut Vec<Sentence>, unit: &mut String, min_chars: usize) {
    let trimmed = unit.trim();
    if trimmed.chars().count() >= min_chars {
        out.push(Sentence {
            text: trimmed.to_string(),
            index: out.len(),
        });
    }
    unit.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotescout_core::MIN_QUOTE_CHARS;

    #[test]
    fn splits_on_terminal_punctuation_and_keeps_it_attached() {
        let text = "The first sentence is here. A second sentence follows! Is this the third sentence?";
        let s = split_sentences(text, MIN_QUOTE_CHARS);
        assert_eq!(s.len(), 3);
        assert_eq!(s[0].text, "The first sentence is here.");
        assert_eq!(s[1].text, "A second sentence follows!");
        assert_eq!(s[2].text, "Is this the third sentence?");
    }

    #[test]
    fn indices_are_dense_after_discarding_short_units() {
        let text = "Heading. This sentence is long enough to keep around. Ok. Another sentence that is also long enough.";
        let s = split_sentences(text, MIN_QUOTE_CHARS);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].index, 0);
        assert_eq!(s[1].index, 1);
        assert!(s[0].text.starts_with("This sentence"));
    }

    #[test]
    fn dotted_tokens_do_not_split_mid_sentence() {
        let text = "Version v1.2 shipped on example.com yesterday afternoon.";
        let s = split_sentences(text, MIN_QUOTE_CHARS);
        assert_eq!(s.len(), 1);
        assert!(s[0].text.contains("v1.2"));
        assert!(s[0].text.contains("example.com"));
    }

    #[test]
    fn trailing_text_without_punctuation_is_kept_when_long_enough() {
        let text = "A proper sentence ends here. a trailing fragment with no terminal punctuation at all";
        let s = split_sentences(text, MIN_QUOTE_CHARS);
        assert_eq!(s.len(), 2);
        assert!(s[1].text.starts_with("a trailing fragment"));
    }

    #[test]
    fn empty_and_noise_inputs_yield_no_sentences() {
        assert!(split_sentences("", MIN_QUOTE_CHARS).is_empty());
        assert!(split_sentences("Hi. Ok. No.", MIN_QUOTE_CHARS).is_empty());
    }
}
