use std::sync::LazyLock;

use regex::Regex;

use crate::rules::RuleSet;

static LABEL_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)Invoice\s*#\s*:*\s*([A-Z0-9\-]+)",
        r"(?i)Invoice\s*No\.?\s*:*\s*([A-Z0-9\-]+)",
        r"(?i)Invoice\s*Number\s*:*\s*([A-Z0-9\-]+)",
        r"(?i)Invoice:\s*([A-Z0-9\-]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

// Utility statements label the number under an account header instead.
const ACCOUNT_MARKER: &str = "Account #/Location ID";
static ACCOUNT_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Invoice Number\s+([0-9]+)").unwrap());

/// Label-based rules in order; a capture only resolves if the curated set of
/// invoice numbers says it is real.
pub fn extract(text: &str, rules: &RuleSet) -> Option<String> {
    for re in LABEL_RES.iter() {
        if let Some(caps) = re.captures(text) {
            let token = caps[1].trim();
            if rules.invoice_numbers.accepts(token) {
                return Some(token.to_string());
            }
        }
    }

    if text.contains(ACCOUNT_MARKER) {
        if let Some(caps) = ACCOUNT_NUMBER_RE.captures(text) {
            let token = &caps[1];
            if rules.invoice_numbers.accepts(token) {
                return Some(token.to_string());
            }
        }
    }

    None
}
