use std::sync::LazyLock;

use regex::Regex;

use crate::rules::RuleSet;

static DESCRIPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:description|service|item)[\s:]+([^\n]+)").unwrap());

/// Service descriptions appear anywhere in the body, so the whole text is
/// tested first. If nothing matches, a labeled description region is isolated
/// and the same table is re-tested against that region only.
pub fn extract(text: &str, rules: &RuleSet) -> Option<String> {
    for (re, canonical) in &rules.services {
        if re.is_match(text) {
            return Some(canonical.clone());
        }
    }

    if let Some(caps) = DESCRIPTION_RE.captures(text) {
        let region = caps[1].trim();
        for (re, canonical) in &rules.services {
            if re.is_match(region) {
                return Some(canonical.clone());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_text_match() {
        let rules = RuleSet::builtin();
        let text = "Invoice\nCommercial Monthly pest control\nTotal: $55.00";
        assert_eq!(extract(text, &rules).as_deref(), Some("Commercial Monthly"));
    }

    #[test]
    fn labeled_region_fallback() {
        let rules = RuleSet::builtin();
        // Pattern only present after a "Description:" label.
        let text = "Invoice\nDescription: March Lawn Care\nTotal";
        assert_eq!(extract(text, &rules).as_deref(), Some("March Lawn Care"));
    }

    #[test]
    fn no_pattern_is_unresolved() {
        let rules = RuleSet::builtin();
        assert_eq!(extract("Invoice\nDescription: window washing", &rules), None);
    }

    #[test]
    fn match_is_case_insensitive() {
        let rules = RuleSet::builtin();
        assert_eq!(
            extract("apartment answering service", &rules).as_deref(),
            Some("Apartment Answering Service")
        );
    }
}
