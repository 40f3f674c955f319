use std::sync::LazyLock;

use regex::Regex;

use crate::rules::RuleSet;

static LABEL_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)Total\s*Due\s*:*\s*\$?([\d,]+\.?\d*)",
        r"(?i)Balance\s*Due\s*:*\s*\$?([\d,]+\.?\d*)",
        r"(?i)Total\s*Amount\s*Due\s*:*\s*\$?([\d,]+\.?\d*)",
        r"(?i)Amount\s*Due\s*:*\s*\$?([\d,]+\.?\d*)",
        r"(?i)Current\s*Invoice\s*Total\s*:*\s*(?:USD\s*)?\$?([\d,]+\.?\d*)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

// Table layouts put the figure on the "Total" line without a due label.
static TOTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Total[^\n]*?\$?([\d,]+\.\d{2})").unwrap());

/// Amount label rules in order; captures are normalized with a `$` prefix
/// before the known-value gate. Fallback: "Total" lines that are not
/// "Subtotal" lines, same gate.
pub fn extract(text: &str, rules: &RuleSet) -> Option<String> {
    for re in LABEL_RES.iter() {
        if let Some(caps) = re.captures(text) {
            let normalized = dollar(caps[1].trim());
            if rules.amounts.accepts(&normalized) {
                return Some(normalized);
            }
        }
    }

    if text.contains("Total") {
        for caps in TOTAL_RE.captures_iter(text) {
            if preceded_by_sub(text, caps.get(0).map_or(0, |m| m.start())) {
                continue;
            }
            let normalized = dollar(&caps[1]);
            if rules.amounts.accepts(&normalized) {
                return Some(normalized);
            }
        }
    }

    None
}

fn dollar(amount: &str) -> String {
    if amount.starts_with('$') {
        amount.to_string()
    } else {
        format!("${amount}")
    }
}

// The regex crate has no lookbehind; check the three bytes before the match.
fn preceded_by_sub(text: &str, start: usize) -> bool {
    start >= 3 && text.as_bytes()[start - 3..start].eq_ignore_ascii_case(b"sub")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_due_label() {
        let rules = RuleSet::builtin();
        assert_eq!(
            extract("Total Due: $568.31", &rules).as_deref(),
            Some("$568.31")
        );
    }

    #[test]
    fn normalizes_missing_dollar_sign() {
        let rules = RuleSet::builtin();
        assert_eq!(
            extract("Balance Due 2,700.84", &rules).as_deref(),
            Some("$2,700.84")
        );
    }

    #[test]
    fn label_variants() {
        let rules = RuleSet::builtin();
        assert_eq!(
            extract("Amount Due: $1,374.00", &rules).as_deref(),
            Some("$1,374.00")
        );
        assert_eq!(
            extract("Current Invoice Total: USD 224.95", &rules).as_deref(),
            Some("$224.95")
        );
    }

    #[test]
    fn unknown_amount_is_unresolved() {
        let rules = RuleSet::builtin();
        assert_eq!(extract("Total Due: $123.45", &rules), None);
    }

    #[test]
    fn total_fallback() {
        let rules = RuleSet::builtin();
        let text = "Qty 1  Service  $650.00\nTotal    $650.00";
        assert_eq!(extract(text, &rules).as_deref(), Some("$650.00"));
    }

    #[test]
    fn subtotal_never_matches() {
        let rules = RuleSet::builtin();
        // $55.00 is a known amount, but it only appears on a Subtotal line.
        assert_eq!(extract("Subtotal: $55.00\nTax: $4.54", &rules), None);
    }

    #[test]
    fn total_after_subtotal_wins() {
        let rules = RuleSet::builtin();
        let text = "Subtotal: $100.00\nTotal: $920.13";
        assert_eq!(extract(text, &rules).as_deref(), Some("$920.13"));
    }

    #[test]
    fn fallback_requires_decimal_amount() {
        let rules = RuleSet::builtin();
        // "Total 1979" has no cents; the fallback pattern demands them.
        assert_eq!(extract("Total 1979", &rules), None);
    }
}
