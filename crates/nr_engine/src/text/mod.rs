//! Summary clean-up ahead of vectorization.

mod stopwords;

pub use stopwords::is_stopword;

/// Token substituted for summaries that carry no usable text.
pub const NO_CONTENT: &str = "no_content";

const MIN_TOKENS: usize = 2;

/// Lowercase `text` and drop English stopwords, keeping at least two tokens
/// when the original has them.
///
/// Empty input and the "full article unavailable." sentinel map to
/// [`NO_CONTENT`].
pub fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(nr_core::UNAVAILABLE_SUMMARY) {
        return NO_CONTENT.to_string();
    }

    let lowered = trimmed.to_lowercase();
    let mut words: Vec<&str> = lowered
        .split_whitespace()
        .filter(|word| !is_stopword(word))
        .collect();

    if words.len() < MIN_TOKENS {
        words = lowered.split_whitespace().take(MIN_TOKENS).collect();
    }

    let cleaned = words.join(" ");
    if cleaned.is_empty() {
        NO_CONTENT.to_string()
    } else {
        cleaned
    }
}
