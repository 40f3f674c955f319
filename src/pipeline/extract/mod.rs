pub mod amount;
pub mod date;
pub mod number;
pub mod service;
pub mod vendor;

use crate::rules::RuleSet;

/// The five resolved fields of one candidate document. `None` is the
/// first-class "unresolved" outcome: no rule produced a validated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    pub vendor_name: Option<String>,
    pub service_type: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<String>,
    pub invoice_amount: Option<String>,
}

/// Resolve every field independently. No field reads another field's outcome,
/// and the whole thing is a pure function of the text.
pub fn extract_fields(text: &str, rules: &RuleSet) -> FieldSet {
    FieldSet {
        vendor_name: vendor::extract(text, rules),
        service_type: service::extract(text, rules),
        invoice_number: number::extract(text, rules),
        invoice_date: date::extract(text, rules),
        invoice_amount: amount::extract(text, rules),
    }
}

// ── Tests ──
