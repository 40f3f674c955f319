use std::sync::LazyLock;

use regex::Regex;

static INVOICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)invoice").unwrap());
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}/\d{1,2}/\d{4}").unwrap());
static MONEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$\s][\d,]+\.\d{2}").unwrap());

/// A document qualifies as an invoice candidate iff all three signals hold:
/// the word "invoice", a date-shaped token, and a currency-shaped token.
/// Pure substring checks over the full text, no positional reasoning.
pub fn is_candidate(text: &str) -> bool {
    INVOICE_RE.is_match(text) && DATE_RE.is_match(text) && MONEY_RE.is_match(text)
}

// ── Tests ──
