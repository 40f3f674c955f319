use std::sync::LazyLock;

use regex::Regex;

use crate::source::PhysicalPage;

static CONTINUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Page 1 of 2").unwrap());

/// One or more contiguous physical pages treated as a single record-bearing
/// unit. Continuation pages are appended in order, joined by a line break.
#[derive(Debug, Clone)]
pub struct LogicalDocument {
    /// Zero-based page indices, contiguous and increasing.
    pub pages: Vec<usize>,
    pub text: String,
}

/// Reporting-only note that two pages were merged. Page numbers are one-based
/// so they read the way a person counts pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeNotice {
    pub first: usize,
    pub second: usize,
}

/// Scan pages in order, merging a "Page 1 of 2" page with its successor.
/// A marker on the final page has nothing to merge with and is emitted alone.
/// Spans longer than two pages are not supported.
pub fn merge_pages(pages: &[PhysicalPage]) -> (Vec<LogicalDocument>, Vec<MergeNotice>) {
    let mut docs = Vec::with_capacity(pages.len());
    let mut merges = Vec::new();
    let mut i = 0;

    while i < pages.len() {
        let page = &pages[i];
        if CONTINUATION_RE.is_match(&page.text) && i + 1 < pages.len() {
            let next = &pages[i + 1];
            docs.push(LogicalDocument {
                pages: vec![page.index, next.index],
                text: format!("{}\n{}", page.text, next.text),
            });
            merges.push(MergeNotice {
                first: page.index + 1,
                second: next.index + 1,
            });
            i += 2;
            continue;
        }
        docs.push(LogicalDocument {
            pages: vec![page.index],
            text: page.text.clone(),
        });
        i += 1;
    }

    (docs, merges)
}

// ── Tests ──
