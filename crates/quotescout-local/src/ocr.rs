//! OCR fan-out orchestration.
//!
//! OCR vendors cap the pages one call may cover. The orchestrator partitions
//! the document into contiguous page groups, fires every group concurrently,
//! and joins all results before any is consumed, so worst-case latency is the
//! slowest group rather than the sum. A single group failure fails the whole
//! operation: partial OCR text is never silently accepted.

use crate::normalize::collapse_ws;
use quotescout_core::{Error, OcrBackend, Result};

/// Vendor page limit per OCR call.
pub const OCR_PAGES_PER_CALL: usize = 5;
/// Hard cap on total pages; larger documents are refused up front so the
/// caller can offer a narrower page selection.
pub const OCR_MAX_PAGES: usize = 200;

#[derive(Debug, Clone)]
pub struct OcrLimits {
    pub pages_per_call: usize,
    pub max_pages: usize,
}

impl Default for OcrLimits {
    fn default() -> Self {
        Self {
            pages_per_call: OCR_PAGES_PER_CALL,
            max_pages: OCR_MAX_PAGES,
        }
    }
}

/// Contiguous, inclusive page range handled by one OCR call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGroup {
    pub index: usize,
    pub first: usize,
    pub last: usize,
}

/// Partition pages `1..=page_count` into groups of at most `pages_per_call`.
pub fn page_groups(page_count: usize, pages_per_call: usize) -> Vec<PageGroup> {
    let pages_per_call = pages_per_call.max(1);
    let mut out = Vec::new();
    let mut first = 1usize;
    while first <= page_count {
        let last = (first + pages_per_call - 1).min(page_count);
        out.push(PageGroup {
            index: out.len(),
            first,
            last,
        });
        first = last + 1;
    }
    out
}

/// Run the full fan-out: fire all group requests concurrently, await all,
/// reassemble in group order, then collapse whitespace to match normalizer
/// output.
pub async fn run_fanout(
    backend: &dyn OcrBackend,
    doc: &[u8],
    page_count: usize,
    limits: &OcrLimits,
) -> Result<String> {
    if page_count == 0 {
        return Ok(String::new());
    }
    if page_count > limits.max_pages {
        return Err(Error::DocumentTooLargeForOcr {
            pages: page_count,
            limit: limits.max_pages,
        });
    }

    let groups = page_groups(page_count, limits.pages_per_call);
    let calls = groups.iter().map(|g| {
        let group = g.index;
        async move {
            backend
                .ocr_pages(doc, g.first, g.last)
                .await
                .map_err(|e| Error::OcrGroupFailed {
                    group,
                    reason: e.to_string(),
                })
        }
    });

    // try_join_all keeps input order, so the output is already sorted by
    // group index regardless of completion order.
    let texts = futures_util::future::try_join_all(calls).await?;
    Ok(collapse_ws(&texts.join(" ")))
}
