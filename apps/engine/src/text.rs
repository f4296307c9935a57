//! Text normalization and frequency-based keyword extraction.
//!
//! Everything here is pure and deterministic — the algorithmic half of the
//! hybrid scorer. Normalization is the shared vocabulary for every matching
//! tier: a keyword and a resume are only ever compared in normalized form.

use std::collections::HashMap;

/// Default keyword count for general extraction.
pub const DEFAULT_TOP_N: usize = 50;

/// Keyword count used when extracting from a job description.
pub const JD_TOP_N: usize = 30;

/// Tokens dropped before frequency ranking. Intentionally small: the length
/// filter (≤ 2 chars) already removes most function words.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "be", "been", "have", "has", "had", "will", "would", "can",
    "could", "should", "this", "that", "these", "those", "it", "its", "they", "their",
];

/// Normalizes text: lowercase, punctuation replaced by spaces, whitespace
/// collapsed to single spaces.
///
/// Punctuation becomes a space rather than being deleted so that
/// "Python/SQL" tokenizes as two words, not "pythonsql". Idempotent.
pub fn normalize(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .flat_map(|c| c.to_lowercase())
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts the `top_n` most frequent keywords from `text`.
///
/// Tokens in the stop-word set or of length ≤ 2 are dropped. Ties are broken
/// by first occurrence, so the ranking is stable for identical input.
/// Empty text yields an empty list.
pub fn extract_keywords(text: &str, top_n: usize) -> Vec<String> {
    let normalized = normalize(text);

    // token -> (count, first-seen position)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, word) in normalized.split_whitespace().enumerate() {
        if word.chars().count() <= 2 || STOP_WORDS.contains(&word) {
            continue;
        }
        counts.entry(word).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));

    ranked
        .into_iter()
        .take(top_n)
        .map(|(word, _)| word.to_string())
        .collect()
}

/// Extracts two-word phrases from normalized text, for phrase-level matching.
pub fn extract_bigrams(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    let words: Vec<&str> = normalized.split_whitespace().collect();
    words
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_strips_punctuation() {
        assert_eq!(normalize("Hello, World!"), "hello world");
    }

    #[test]
    fn test_normalize_punctuation_becomes_space_not_deleted() {
        // "Python/SQL" must not collapse into one token
        assert_eq!(normalize("Python/SQL"), "python sql");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  a\t\tb \n c  "), "a b c");
    }

    #[test]
    fn test_normalize_empty_is_empty() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = ["Hello, World!", "  C++ & Rust  ", "already normalized"];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_extract_keywords_drops_stop_words_and_short_tokens() {
        let keywords = extract_keywords("the api is on the web", 10);
        assert_eq!(keywords, vec!["api", "web"]);
    }

    #[test]
    fn test_extract_keywords_ranks_by_frequency() {
        let keywords = extract_keywords("rust python rust docker rust python", 10);
        assert_eq!(keywords, vec!["rust", "python", "docker"]);
    }

    #[test]
    fn test_extract_keywords_ties_break_by_first_occurrence() {
        let keywords = extract_keywords("kafka redis postgres", 10);
        assert_eq!(keywords, vec!["kafka", "redis", "postgres"]);
    }

    #[test]
    fn test_extract_keywords_respects_top_n() {
        let keywords = extract_keywords("alpha alpha beta beta gamma", 2);
        assert_eq!(keywords.len(), 2);
        assert!(!keywords.contains(&"gamma".to_string()));
    }

    #[test]
    fn test_extract_keywords_empty_text() {
        assert!(extract_keywords("", 10).is_empty());
    }

    #[test]
    fn test_extract_bigrams() {
        let bigrams = extract_bigrams("machine learning engineer");
        assert_eq!(bigrams, vec!["machine learning", "learning engineer"]);
    }

    #[test]
    fn test_extract_bigrams_short_input() {
        assert!(extract_bigrams("rust").is_empty());
        assert!(extract_bigrams("").is_empty());
    }
}
