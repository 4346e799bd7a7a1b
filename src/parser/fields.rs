//! Tolerant extraction of size and reserve fields from one listing block.
//!
//! Nothing here fails: text that does not fit a known pattern degrades to
//! `None` / `ReserveType::Unknown`.

use crate::models::ReserveType;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Digits (optionally split by spaces, tabs or NBSP on the same line) directly followed by `m²`
static SIZE_RE: Lazy<Regex> = Lazy::new(|| compile(r"(?i)(\d[\d \t\x{A0}]*)m²"));

/// Fields pulled out of a listing block
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub size_m2: Option<f64>,
    pub reserve_type: ReserveType,
    pub reserve_price: Option<f64>,
}

/// A reserve pattern and the classification it produces, tried in order
struct ReserveRule {
    pattern: Lazy<Regex>,
    outcome: fn(&Captures<'_>) -> (ReserveType, Option<f64>),
}

/// First match wins. An amount in front of "Court Reserve" is checked before the
/// bare phrases, so "No Court Reserve" never reads as a court amount.
static RESERVE_RULES: [ReserveRule; 3] = [
    ReserveRule {
        pattern: Lazy::new(|| {
            compile(r"(?i)\bR\s*(\d[\d\s,]*)(?:\.\d+)?\s*(?:[–-]\s*)?Court\s+Reserve")
        }),
        outcome: court_reserve,
    },
    ReserveRule {
        pattern: Lazy::new(|| compile(r"(?i)\bBank\s+Reserve\b")),
        outcome: |_| (ReserveType::Bank, None),
    },
    ReserveRule {
        pattern: Lazy::new(|| compile(r"(?i)\bNo\s+Court\s+Reserve\b")),
        outcome: |_| (ReserveType::NoReserve, None),
    },
];

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("listing field pattern must compile")
}

fn court_reserve(caps: &Captures<'_>) -> (ReserveType, Option<f64>) {
    let price = caps.get(1).and_then(|m| parse_amount(m.as_str()));
    (ReserveType::Court, price)
}

/// Parse a currency amount, ignoring currency symbols, spaces and thousands separators
pub fn parse_amount(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().ok()
}

/// Extract every field for a block
pub fn extract_fields(text: &str) -> ExtractedFields {
    let (reserve_type, reserve_price) = parse_reserve(text);
    ExtractedFields {
        size_m2: parse_size(text),
        reserve_type,
        reserve_price,
    }
}

/// First `NNN m²` figure in the text
pub fn parse_size(text: &str) -> Option<f64> {
    let caps = SIZE_RE.captures(text)?;
    let raw: String = caps[1].chars().filter(|c| !c.is_whitespace()).collect();
    raw.parse::<f64>().ok()
}

/// Classify the reserve and, for court reserves, the amount
pub fn parse_reserve(text: &str) -> (ReserveType, Option<f64>) {
    RESERVE_RULES
        .iter()
        .find_map(|rule| rule.pattern.captures(text).map(|caps| (rule.outcome)(&caps)))
        .unwrap_or((ReserveType::Unknown, None))
}
