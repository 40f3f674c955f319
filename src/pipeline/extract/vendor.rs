use crate::rules::RuleSet;

/// Vendor names sit in the letterhead, so only the top of the document is
/// scanned: the first 6 of the first 10 non-blank lines.
const HEAD_LINES: usize = 10;
const SCAN_LINES: usize = 6;

/// First vendor pattern to match anywhere in the scanned lines wins. Vendor
/// patterns map straight to canonical names, so there is no known-value gate.
pub fn extract(text: &str, rules: &RuleSet) -> Option<String> {
    let head: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(HEAD_LINES)
        .collect();

    for line in head.iter().take(SCAN_LINES) {
        for (re, canonical) in &rules.vendors {
            if re.is_match(line) {
                return Some(canonical.clone());
            }
        }
    }
    None
}
