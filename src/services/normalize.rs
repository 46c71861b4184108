/// Folds a source string for similarity matching: case, inner whitespace,
/// quotes, ellipses, trailing punctuation and accelerator markers are ignored.
pub fn normalize(text: &str) -> String {
    let mut s = text.trim().to_lowercase();

    s = s.split_whitespace().collect::<Vec<_>>().join(" ");

    for ch in ['“', '”', '’', '‘', '…', '"', '\'', '&'] {
        s = s.replace(ch, "");
    }
    s = s.replace("...", "");

    s.trim_end_matches(['.', ':', '!', '?', ' ']).to_string()
}
