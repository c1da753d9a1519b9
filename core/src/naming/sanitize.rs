use crate::prelude::is_segment_char;

/// Marks a display value that must not appear in folder names.
pub const NOT_APPLICABLE: &str = "N/A";

/// Replaces every character outside `[A-Za-z0-9_-]` and trims the result.
pub fn sanitize(raw: &str, replacement: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if is_segment_char(ch) {
            cleaned.push(ch);
        } else {
            cleaned.push_str(replacement);
        }
    }
    cleaned.trim().to_string()
}

/// Like [`sanitize`], but never returns an empty segment.
pub fn sanitize_segment(raw: &str, replacement: &str, placeholder: &str) -> String {
    let cleaned = sanitize(raw, replacement);
    if cleaned.is_empty() {
        placeholder.to_string()
    } else {
        cleaned
    }
}
