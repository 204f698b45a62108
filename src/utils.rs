use std::env::var;

use unicode_normalization::UnicodeNormalization;

/// Get the value of ENV var, or a default
///
/// Only when:
/// - It is set
/// - It is not empty
pub fn env_var_or_else(var_name: &'static str, or_else: fn() -> String) -> String {
    env_var(var_name).unwrap_or_else(or_else)
}

/// Get the value of ENV var, if it is set and not empty
pub fn env_var(var_name: &'static str) -> Option<String> {
    var(var_name).ok().filter(|value| !value.is_empty())
}

/// Unicode NFC normalization, whitespace is kept
///
/// Stored text and search queries are both in this form, so they compare byte for byte
pub fn normalize_unicode(text: &str) -> String {
    text.nfc().collect::<String>()
}

/// Normalize user provided text like folder names, tag names and search queries
///
/// Trims whitespace and applies Unicode NFC normalization, `None` when nothing is left
pub fn normalize_text(text: &str) -> Option<String> {
    let text = text.trim().nfc().collect::<String>();

    if text.is_empty() { None } else { Some(text) }
}
