//! Whitespace normalization shared by the extractors

/// Collapse every run of whitespace into one ASCII space and trim both ends
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
