//! Stat field parser: pulls one labeled integer out of recognized text.
//!
//! OCR output has no reliable layout, so each field is located by its label
//! alone. A label matches case-insensitively whether its words are joined
//! (`FireRate`) or separated (`Fire Rate`, or split across a line break).

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Labels the record builder asks for, in the order they appear on most stat screens.
pub const STAT_LABELS: [&str; 9] = [
    "Damage",
    "Stability",
    "Range",
    "Accuracy",
    "Control",
    "Handling",
    "Mobility",
    "Fire Rate",
    "Muzzle Velocity",
];

/// Compiled patterns for [`STAT_LABELS`], built on first use.
static STAT_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    STAT_LABELS
        .iter()
        .filter_map(|label| compile_label(label).map(|re| (*label, re)))
        .collect()
});

fn compile_label(label: &str) -> Option<Regex> {
    let pattern = label_pattern(label)?;
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            debug!("label {:?} produced an invalid pattern: {}", label, e);
            None
        }
    }
}

/// Return the first integer that follows `label` in `text`, or 0 when the
/// label (or a number after it) is absent. Never fails: a missing stat is
/// expected and must degrade to zero.
pub fn parse_field(text: &str, label: &str) -> u32 {
    let value = match STAT_PATTERNS.iter().find(|(known, _)| *known == label) {
        Some((_, re)) => first_integer(re, text),
        None => compile_label(label).map_or(0, |re| first_integer(&re, text)),
    };
    debug!("parsed {} = {}", label, value);
    value
}

fn first_integer(re: &Regex, text: &str) -> u32 {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| parse_integer(m.as_str()))
        .unwrap_or(0)
}

/// Build the case-insensitive pattern for a label. The single capture group
/// is the integer; thousands separators ("1,200") are accepted.
pub fn label_pattern(label: &str) -> Option<String> {
    let words = label_words(label);
    if words.is_empty() {
        return None;
    }
    let body = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join(r"\s*");
    Some(format!(r"(?i)\b{}\s*:?\s*(\d{{1,3}}(?:,\d{{3}})+|\d+)", body))
}

/// Split a label into words on whitespace and on lower-to-upper case
/// boundaries, so "FireRate" and "Fire Rate" yield the same words.
fn label_words(label: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in label.split_whitespace() {
        let mut current = String::new();
        let mut prev_lower = false;
        for c in chunk.chars() {
            if c.is_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

/// Digits only; an out-of-range value degrades to 0 like a missing one.
fn parse_integer(raw: &str) -> u32 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<u32>().unwrap_or(0)
}
