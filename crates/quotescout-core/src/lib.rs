use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cache miss: {0}")]
    CacheMiss(String),
    #[error("segment {index} not found for {key}")]
    SegmentNotFound { key: String, index: usize },
    #[error("ocr not configured: {0}")]
    OcrUnavailable(String),
    #[error("ocr group {group} failed: {reason}")]
    OcrGroupFailed { group: usize, reason: String },
    #[error("document too large for ocr: {pages} pages exceeds limit {limit}")]
    DocumentTooLargeForOcr { pages: usize, limit: usize },
    #[error("refinement failed: {0}")]
    Refinement(String),
    #[error("extract failed: {0}")]
    Extract(String),
    #[error("operation timed out after {0} ms")]
    Timeout(u64),
    #[error("not configured: {0}")]
    NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, Error>;

// Scoring weights, calibrated empirically. Named constants so deployments can
// tune a ScoreConfig without touching scorer logic.
pub const W_KEYWORD_HITS: f64 = 2.0;
pub const W_FUZZY: f64 = 1.5;
pub const W_EXACT_TOPIC: f64 = 3.0;
pub const W_DENSITY: f64 = 1.0;
pub const W_LENGTH: f64 = 0.3;
pub const W_POSITION: f64 = 0.1;

/// Value assigned to `exact_topic_match` when the whole topic appears verbatim.
pub const EXACT_TOPIC_VALUE: f64 = 2.0;
/// Keyword density is hits per word, scaled into the same range as the other signals.
pub const DENSITY_SCALE: f64 = 10.0;
/// Penalty factor applied when a sentence falls outside the preferred length band.
pub const LENGTH_PENALTY: f64 = 0.5;
/// Position weight decays linearly with index and floors at `1.0 - POSITION_DECAY_CAP`.
pub const POSITION_DECAY_CAP: f64 = 0.8;

/// Normalized edit distance above which a fuzzy match is ignored entirely.
pub const FUZZY_DISTANCE_CUTOFF: f64 = 0.6;
/// Fuzzy weight at or above which a sentence is a candidate on similarity alone.
pub const FUZZY_ACCEPT_WEIGHT: f64 = 0.3;
/// Composite score above which a sentence is a candidate without any direct hit.
pub const SCORE_FLOOR: f64 = 0.8;

/// Units shorter than this are headers/labels/noise, not quotable sentences.
pub const MIN_QUOTE_CHARS: usize = 20;
pub const MAX_QUOTE_CHARS: usize = 500;

/// Tunable scoring surface. Observed variants of this pipeline disagree on the
/// exact thresholds, so none of them is treated as canonical; the constants
/// above are defaults, not law.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    pub w_keyword_hits: f64,
    pub w_fuzzy: f64,
    pub w_exact_topic: f64,
    pub w_density: f64,
    pub w_length: f64,
    pub w_position: f64,
    pub exact_topic_value: f64,
    pub density_scale: f64,
    pub length_penalty: f64,
    pub position_decay_cap: f64,
    pub fuzzy_distance_cutoff: f64,
    pub fuzzy_accept_weight: f64,
    pub score_floor: f64,
    pub min_quote_chars: usize,
    pub max_quote_chars: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            w_keyword_hits: W_KEYWORD_HITS,
            w_fuzzy: W_FUZZY,
            w_exact_topic: W_EXACT_TOPIC,
            w_density: W_DENSITY,
            w_length: W_LENGTH,
            w_position: W_POSITION,
            exact_topic_value: EXACT_TOPIC_VALUE,
            density_scale: DENSITY_SCALE,
            length_penalty: LENGTH_PENALTY,
            position_decay_cap: POSITION_DECAY_CAP,
            fuzzy_distance_cutoff: FUZZY_DISTANCE_CUTOFF,
            fuzzy_accept_weight: FUZZY_ACCEPT_WEIGHT,
            score_floor: SCORE_FLOOR,
            min_quote_chars: MIN_QUOTE_CHARS,
            max_quote_chars: MAX_QUOTE_CHARS,
        }
    }
}

/// One candidate quote unit: a sentence and its position in the segmented
/// sequence. Indices are dense (discarded short units are renumbered away)
/// and stable for the lifetime of one ranking pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSentence {
    pub text: String,
    pub index: usize,
    pub keyword_hits: u32,
    /// 0..1, higher = more similar to the topic.
    pub fuzzy_weight: f64,
    /// 0.0, or `exact_topic_value` when the whole topic appears verbatim.
    pub exact_topic_match: f64,
    pub keyword_density: f64,
    pub length_ok: f64,
    pub position_weight: f64,
    /// Weighted sum of the signals above. Primary ordering is score
    /// descending; ties break by `index` ascending for determinism.
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub quote: String,
    pub relevance: String,
}

/// Refinement services answer with inconsistent JSON shapes: sometimes a bare
/// string per quote, sometimes an object. Normalize at the boundary,
/// immediately after parsing, so nothing downstream sees the raw shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawQuote {
    WithRelevance { quote: String, relevance: String },
    PlainString(String),
}

impl RawQuote {
    pub fn into_quote(self, fallback_relevance: &str) -> Quote {
        match self {
            RawQuote::WithRelevance { quote, relevance } => Quote { quote, relevance },
            RawQuote::PlainString(quote) => Quote {
                quote,
                relevance: fallback_relevance.to_string(),
            },
        }
    }
}

/// Parse a refinement response as a JSON array of quotes.
///
/// Tolerant of a fenced code block and of prose around the array; returns
/// `None` when no parseable array is present (the caller falls back, it does
/// not error).
pub fn parse_raw_quotes(raw: &str) -> Option<Vec<RawQuote>> {
    let t = raw.trim();
    let t = t
        .strip_prefix("```json")
        .or_else(|| t.strip_prefix("```"))
        .map(|s| s.strip_suffix("```").unwrap_or(s))
        .unwrap_or(t)
        .trim();
    if let Ok(v) = serde_json::from_str::<Vec<RawQuote>>(t) {
        return Some(v);
    }
    // Models often wrap the array in explanation text; retry on the outermost brackets.
    let start = t.find('[')?;
    let end = t.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Vec<RawQuote>>(&t[start..=end]).ok()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankRequest {
    /// User-supplied search phrase used to judge sentence relevance.
    pub topic: String,
    /// Raw source text; may be markup, plain text, or OCR output.
    pub text: String,
    /// True when `text` came from OCR; forwarded to the refinement service.
    pub ocr_hint: bool,
    /// Operation-level timeout for the whole ranking request.
    pub timeout_ms: Option<u64>,
}

impl RankRequest {
    pub fn new(topic: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            text: text.into(),
            ocr_hint: false,
            timeout_ms: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Outcome of one ranking pass.
///
/// `NoSignal` is a legitimate empty result (no keyword or fuzzy overlap at
/// all), not an error; the refinement service is never invoked for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RankOutcome {
    NoSignal,
    Ranked {
        quotes: Vec<Quote>,
        /// False when the quotes are the locally selected sentences (the
        /// refinement service was absent, failed, or answered with non-JSON).
        refined: bool,
    },
}

impl RankOutcome {
    pub fn quotes(&self) -> &[Quote] {
        match self {
            RankOutcome::NoSignal => &[],
            RankOutcome::Ranked { quotes, .. } => quotes,
        }
    }
}

/// A half-open character range over a cached document's content. Segments
/// cover `[0, len)` with a fixed size and are computed lazily from the cached
/// content, never stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentMeta {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

/// Ingestion result for a document: small documents come straight back and
/// are never cached; oversized ones are cached whole and served per segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IngestOutcome {
    Inline { content: String },
    Segmented { segments: Vec<SegmentMeta> },
}

/// True when the string parses as an absolute URL usable as a document key.
pub fn looks_like_url(s: &str) -> bool {
    url::Url::parse(s)
        .map(|u| !u.cannot_be_a_base())
        .unwrap_or(false)
}

/// Semantic refinement service (typically an LLM). Returns the model's raw
/// text response; the pipeline owns parsing and the fallback on malformed
/// output.
#[async_trait::async_trait]
pub trait RefinementBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn refine(&self, topic: &str, candidate_block: &str, ocr_hint: bool) -> Result<String>;
}

/// OCR backend able to read a bounded, inclusive page range of a binary
/// document. Vendors cap pages per call; the orchestrator owns the fan-out.
#[async_trait::async_trait]
pub trait OcrBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn ocr_pages(&self, doc: &[u8], first_page: usize, last_page: usize) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuzzyHit {
    /// Position in the corpus handed to `search`.
    pub index: usize,
    /// Native distance score: lower = more similar. The scorer owns the
    /// inversion into a 0..1 weight.
    pub score: f64,
}

/// Approximate full-text matcher between a topic and a sentence corpus.
pub trait FuzzySearch: Send + Sync {
    fn search(&self, corpus: &[&str], query: &str) -> Vec<FuzzyHit>;
}
