pub mod aggregate;
pub mod classify;
pub mod extract;

use crate::rules::RuleSet;
use crate::source::PhysicalPage;
use aggregate::MergeNotice;

/// One extracted invoice: the five resolved fields plus where it came from.
/// Unresolved fields stay `None` and are persisted as empty columns.
#[derive(Debug, Clone)]
pub struct Record {
    /// Zero-based indices of the source pages.
    pub pages: Vec<usize>,
    /// Constant context label from the rule set.
    pub property_name: String,
    pub vendor_name: Option<String>,
    pub service_type: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<String>,
    pub invoice_amount: Option<String>,
}

/// Plain-data output of one pipeline run, for the presentation layer and the
/// ledger to consume independently.
#[derive(Debug)]
pub struct RunOutput {
    /// Records in source-document order.
    pub records: Vec<Record>,
    pub merges: Vec<MergeNotice>,
    pub candidates: usize,
    pub rejected: usize,
}

/// Three-stage pipeline: pages → logical documents → candidates → records.
pub fn process(pages: &[PhysicalPage], rules: &RuleSet) -> RunOutput {
    let (docs, merges) = aggregate::merge_pages(pages);

    let mut records = Vec::new();
    let mut rejected = 0usize;
    for doc in &docs {
        if !classify::is_candidate(&doc.text) {
            rejected += 1;
            continue;
        }
        let fields = extract::extract_fields(&doc.text, rules);
        records.push(Record {
            pages: doc.pages.clone(),
            property_name: rules.property_name.clone(),
            vendor_name: fields.vendor_name,
            service_type: fields.service_type,
            invoice_number: fields.invoice_number,
            invoice_date: fields.invoice_date,
            invoice_amount: fields.invoice_amount,
        });
    }

    RunOutput {
        candidates: records.len(),
        rejected,
        merges,
        records,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{PageSource, TextSource};

    fn fixture_pages() -> Vec<PhysicalPage> {
        let text = std::fs::read_to_string("tests/fixtures/oaks_sample.txt").unwrap();
        TextSource::new(text).pages().unwrap()
    }

    #[test]
    fn fixture_run() {
        let rules = RuleSet::builtin();
        let pages = fixture_pages();
        assert_eq!(pages.len(), 4);

        let out = process(&pages, &rules);
        assert_eq!(out.candidates, 2);
        assert_eq!(out.rejected, 1);
        assert_eq!(out.merges, vec![MergeNotice { first: 1, second: 2 }]);

        let first = &out.records[0];
        assert_eq!(first.pages, vec![0, 1]);
        assert_eq!(first.property_name, "Oaks at Creekside");
        assert_eq!(first.vendor_name.as_deref(), Some("A&B Pest and Termite"));
        assert_eq!(first.invoice_number.as_deref(), Some("6213"));
        assert_eq!(first.invoice_date.as_deref(), Some("03/03/2025"));
        assert_eq!(first.invoice_amount.as_deref(), Some("$568.31"));

        let second = &out.records[1];
        assert_eq!(second.pages, vec![2]);
        assert_eq!(second.vendor_name.as_deref(), Some("A+ Lawncare"));
        assert_eq!(second.service_type.as_deref(), Some("March Lawn Care"));
        assert_eq!(second.invoice_number.as_deref(), Some("12523"));
        assert_eq!(second.invoice_amount.as_deref(), Some("$2,700.84"));
    }

    #[test]
    fn record_order_follows_document_order() {
        let rules = RuleSet::builtin();
        let out = process(&fixture_pages(), &rules);
        let firsts: Vec<usize> = out.records.iter().map(|r| r.pages[0]).collect();
        let mut sorted = firsts.clone();
        sorted.sort_unstable();
        assert_eq!(firsts, sorted);
    }

    #[test]
    fn empty_pages_all_rejected() {
        let rules = RuleSet::builtin();
        let pages = vec![
            PhysicalPage { index: 0, text: String::new() },
            PhysicalPage { index: 1, text: String::new() },
        ];
        let out = process(&pages, &rules);
        assert!(out.records.is_empty());
        assert_eq!(out.rejected, 2);
    }

    #[test]
    fn run_is_deterministic() {
        let rules = RuleSet::builtin();
        let pages = fixture_pages();
        let a = process(&pages, &rules);
        let b = process(&pages, &rules);
        assert_eq!(a.candidates, b.candidates);
        assert_eq!(a.records.len(), b.records.len());
        for (x, y) in a.records.iter().zip(&b.records) {
            assert_eq!(x.invoice_number, y.invoice_number);
            assert_eq!(x.invoice_amount, y.invoice_amount);
        }
    }
}
