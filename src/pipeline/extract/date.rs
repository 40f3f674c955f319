use std::sync::LazyLock;

use regex::Regex;

use crate::rules::RuleSet;

static LABEL_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)Due\s*Date\s*:*\s*(\d{1,2}/\d{1,2}/\d{4})",
        r"(?i)Balance\s*Due\s*Date\s*:*\s*(\d{1,2}/\d{1,2}/\d{4})",
        r"(?i)Payment\s*Due\s*Date\s*:*\s*(\d{1,2}/\d{1,2}/\d{4})",
        r"(?i)Due\s*on\s*(\d{1,2}/\d{1,2}/\d{4})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static DATE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}/\d{1,2}/\d{4}").unwrap());

/// Due-date label rules in order, gated by the curated date set. Fallback:
/// when "due date" appears at all, take the first known date token within the
/// configured window of its first occurrence.
pub fn extract(text: &str, rules: &RuleSet) -> Option<String> {
    for re in LABEL_RES.iter() {
        if let Some(caps) = re.captures(text) {
            let token = caps[1].trim();
            if rules.due_dates.accepts(token) {
                return Some(token.to_string());
            }
        }
    }

    let lower = text.to_lowercase();
    if let Some(due_pos) = lower.find("due date") {
        for m in DATE_TOKEN_RE.find_iter(text) {
            let token = m.as_str();
            if rules.due_dates.accepts(token)
                && m.start().abs_diff(due_pos) < rules.due_date_window
            {
                return Some(token.to_string());
            }
        }
    }

    None
}
