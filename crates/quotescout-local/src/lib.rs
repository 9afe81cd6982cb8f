//! Local quote-ranking pipeline.
//!
//! `QuotePipeline` wires the pieces together: normalize → segment → score →
//! context windows → (optional) semantic refinement, plus the content cache,
//! chunk server, and OCR fan-out for oversized or scanned documents. All
//! collaborators are injected; tests construct isolated instances.

use sha2::{Digest, Sha256};
use std::sync::Arc;

use quotescout_core::{
    looks_like_url, Error, FuzzySearch, IngestOutcome, OcrBackend, RankOutcome, RankRequest,
    RefinementBackend, Result, ScoreConfig,
};

pub mod cache;
pub mod extract;
pub mod fuzzy;
pub mod normalize;
pub mod ocr;
pub mod refine;
pub mod score;
pub mod segments;
pub mod sentence;
pub mod window;

use cache::{CacheConfig, ContentCache};
use fuzzy::EditDistanceSearch;
use normalize::normalize;
use ocr::OcrLimits;
use refine::refine_or_fallback;
use score::{filter_candidates, score_sentences};
use segments::{segment_plan, slice_chars, SegmentConfig};
use sentence::split_sentences;
use window::{candidate_block, select_context_windows};

pub struct QuotePipeline {
    score_cfg: ScoreConfig,
    segment_cfg: SegmentConfig,
    ocr_limits: OcrLimits,
    cache: ContentCache,
    fuzzy: Box<dyn FuzzySearch>,
    refiner: Option<Arc<dyn RefinementBackend>>,
    ocr: Option<Arc<dyn OcrBackend>>,
}

impl QuotePipeline {
    /// Pipeline with default configuration, the built-in edit-distance fuzzy
    /// matcher, and no external backends (ranking falls back to the locally
    /// selected sentences; OCR is unavailable).
    pub fn new() -> Result<Self> {
        Self::with_configs(
            ScoreConfig::default(),
            CacheConfig::default(),
            SegmentConfig::default(),
            OcrLimits::default(),
        )
    }

    pub fn with_configs(
        score_cfg: ScoreConfig,
        cache_cfg: CacheConfig,
        segment_cfg: SegmentConfig,
        ocr_limits: OcrLimits,
    ) -> Result<Self> {
        let fuzzy = EditDistanceSearch::new(score_cfg.fuzzy_distance_cutoff)?;
        Ok(Self {
            score_cfg,
            segment_cfg,
            ocr_limits,
            cache: ContentCache::new(cache_cfg),
            fuzzy: Box::new(fuzzy),
            refiner: None,
            ocr: None,
        })
    }

    pub fn with_refiner(mut self, refiner: Arc<dyn RefinementBackend>) -> Self {
        self.refiner = Some(refiner);
        self
    }

    pub fn with_ocr_backend(mut self, ocr: Arc<dyn OcrBackend>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    pub fn with_fuzzy(mut self, fuzzy: Box<dyn FuzzySearch>) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Rank a document's sentences against a topic.
    ///
    /// `NoSignal` means the document has no relevance signal at all; the
    /// refinement service is not consulted for it. When a request timeout is
    /// set it bounds the whole operation, refinement call included.
    pub async fn rank(&self, req: &RankRequest) -> Result<RankOutcome> {
        match req.timeout() {
            Some(t) => tokio::time::timeout(t, self.rank_inner(req))
                .await
                .map_err(|_| Error::Timeout(req.timeout_ms.unwrap_or(0)))?,
            None => self.rank_inner(req).await,
        }
    }

    async fn rank_inner(&self, req: &RankRequest) -> Result<RankOutcome> {
        let text = normalize(&req.text);
        let sentences = split_sentences(&text, self.score_cfg.min_quote_chars);
        if sentences.is_empty() {
            return Ok(RankOutcome::NoSignal);
        }

        let pass = score_sentences(&sentences, &req.topic, self.fuzzy.as_ref(), &self.score_cfg);
        if !pass.has_signal() {
            return Ok(RankOutcome::NoSignal);
        }
        let candidates = filter_candidates(&pass, &self.score_cfg);
        if candidates.is_empty() {
            return Ok(RankOutcome::NoSignal);
        }

        let indices = select_context_windows(&candidates, sentences.len());
        let selected: Vec<String> = indices
            .iter()
            .filter_map(|&i| sentences.get(i).map(|s| s.text.clone()))
            .collect();
        let block = candidate_block(&sentences, &indices);

        let (quotes, refined) = refine_or_fallback(
            self.refiner.as_deref(),
            &req.topic,
            &block,
            req.ocr_hint,
            &selected,
        )
        .await;
        Ok(RankOutcome::Ranked { quotes, refined })
    }

    /// Decide once at ingestion whether a document needs the chunk server.
    ///
    /// Oversized content is cached whole and described by its segment plan;
    /// small documents come straight back and are never cached.
    pub fn ingest_large_document(&self, key: &str, content: &str, is_ocr: bool) -> IngestOutcome {
        let total = content.chars().count();
        if total > self.segment_cfg.segment_size {
            self.cache.put(key, content.to_string(), is_ocr);
            IngestOutcome::Segmented {
                segments: segment_plan(total, self.segment_cfg.segment_size),
            }
        } else {
            IngestOutcome::Inline {
                content: content.to_string(),
            }
        }
    }

    /// Serve one fixed-size window of a previously ingested document.
    ///
    /// An absent or expired cache entry is a `CacheMiss` (the caller must
    /// re-ingest); an index past the end of the plan is `SegmentNotFound`.
    pub fn fetch_segment(&self, key: &str, index: usize) -> Result<String> {
        let (content, _is_ocr) = self
            .cache
            .get(key)
            .ok_or_else(|| Error::CacheMiss(key.to_string()))?;
        let plan = segment_plan(content.chars().count(), self.segment_cfg.segment_size);
        let seg = plan.get(index).ok_or_else(|| Error::SegmentNotFound {
            key: key.to_string(),
            index,
        })?;
        Ok(slice_chars(&content, seg.start, seg.end))
    }

    /// OCR a scanned document via the page-group fan-out and record the
    /// reassembled text in the cache under the document identity.
    pub async fn run_ocr(&self, key: &str, doc: &[u8], page_count: usize) -> Result<String> {
        let Some(backend) = &self.ocr else {
            return Err(Error::OcrUnavailable(
                "no ocr backend installed".to_string(),
            ));
        };
        let text = ocr::run_fanout(backend.as_ref(), doc, page_count, &self.ocr_limits).await?;
        self.cache.put(key, text.clone(), true);
        Ok(text)
    }
}

/// Stable cache identity for a document: its URL when it has one, otherwise
/// a hash over the title and a content prefix (dropped local files have no
/// URL but still need a repeatable key).
pub fn document_key(url: Option<&str>, title: &str, content: &str) -> String {
    if let Some(u) = url {
        if looks_like_url(u) {
            return u.to_string();
        }
    }
    let mut h = Sha256::new();
    h.update(b"title:");
    h.update(title.as_bytes());
    h.update(b"\nprefix:");
    let prefix: String = content.chars().take(512).collect();
    h.update(prefix.as_bytes());
    format!("doc:{}", hex::encode(h.finalize()))
}
