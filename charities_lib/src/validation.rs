//! Input clean-up: register identifiers and free-text search terms.

use std::sync::LazyLock;

use regex::Regex;

pub const MAX_SEARCH_LENGTH: usize = 100;

/// Leading decoration a caller may put in front of a CCEW number: the
/// `GB-CHC-` org-id prefix, in any case, with optional separators.
static CCEW_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\s#:.]*(?:GB[-\s]*CHC[-\s]*)?[-\s#:.]*").expect("prefix regex compiles")
});

/// `GB-SC-` and/or the register's own `SC` letters.
static OSCR_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\s#:.]*(?:GB[-\s]*SC[-\s]*)?(?:SC)?[-\s#:.]*")
        .expect("prefix regex compiles")
});

/// `GB-NIC-` and/or the register's own `NIC` letters.
static CCNI_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\s#:.]*(?:GB[-\s]*NIC[-\s]*)?(?:NIC)?[-\s#:.]*")
        .expect("prefix regex compiles")
});

/// Digits of a register number once `prefix` has been removed.
///
/// Returns `None` when nothing numeric is left, or when letters remain after
/// the prefix (another register's identifier); neither can name a charity on
/// this register.
fn registration_digits(prefix: &Regex, input: &str) -> Option<String> {
    let stripped = prefix.replace(input.trim(), "");
    if stripped.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let digits: String = stripped.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

fn without_leading_zeros(digits: String) -> Option<String> {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Bare CCEW number: digits only, leading zeros dropped.
pub fn ccew_number(input: &str) -> Option<String> {
    without_leading_zeros(registration_digits(&CCEW_PREFIX, input)?)
}

/// Scottish register number: `SC` plus six zero-padded digits.
pub fn oscr_number(input: &str) -> Option<String> {
    let digits = registration_digits(&OSCR_PREFIX, input)?;
    let value: u64 = digits.parse().ok()?;
    if value == 0 {
        return None;
    }
    Some(format!("SC{:06}", value))
}

/// Bare CCNI number: digits only, leading zeros dropped.
pub fn ccni_number(input: &str) -> Option<String> {
    without_leading_zeros(registration_digits(&CCNI_PREFIX, input)?)
}

/// Strip ASCII control characters, collapse surrounding whitespace and cap the
/// length at [`MAX_SEARCH_LENGTH`] bytes (on a character boundary).
pub fn sanitize_search_text(input: &str) -> Option<String> {
    let cleaned: String = input.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    let mut end = cleaned.len().min(MAX_SEARCH_LENGTH);
    while !cleaned.is_char_boundary(end) {
        end -= 1;
    }
    Some(cleaned[..end].trim_end().to_string())
}
