//! Keyword and named-entity heuristics for headline text
//!
//! Entities are found with hand-written patterns:
//! - Known countries, organizations, companies and people
//! - Titles followed by a name ("President Macron")
//! - Generic capitalized multi-word phrases ("Central Bank Governor")
//!
//! All output is case-folded.

use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

/// Words ignored when extracting keywords
pub static STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with",
    "by", "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must",
    "shall", "can", "need", "dare", "ought", "used", "it", "its", "this", "that",
    "these", "those", "i", "you", "he", "she", "we", "they", "what", "which", "who",
    "whom", "whose", "where", "when", "why", "how", "all", "each", "every", "both",
    "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only", "own",
    "same", "so", "than", "too", "very", "just", "also", "now", "new", "says", "said",
    "report", "reports", "after", "before", "over", "under", "again", "further", "then",
    "once", "here", "there", "about", "into", "through", "during", "above", "below",
    "between", "up", "down", "out", "off", "first", "last", "latest",
    "breaking", "live", "update", "updates", "news", "today", "yesterday", "week",
];

/// Minimum length of a plain keyword token
pub const MIN_KEYWORD_LEN: usize = 4;

static STOP_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

// Full names are matched case-insensitively; acronyms only in capitals so
// that "us", "who" or "fed" in running text are not mistaken for entities.
static COUNTRY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(United States|America|China|Russia|Ukraine|Israel|Palestine|Gaza|Iran|North Korea|South Korea|Taiwan|India|Pakistan|Britain|France|Germany|Japan|Brazil|Mexico|Canada|Australia|Saudi Arabia|Turkey|Egypt|Syria|Venezuela|Argentina)\b").unwrap()
});

static COUNTRY_ACRONYM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(USA|US|UK)\b").unwrap()
});

static ORGANIZATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(European Union|World Bank|Federal Reserve|Congress|Senate|Pentagon|Supreme Court|White House|Kremlin|Beijing)\b").unwrap()
});

static ORGANIZATION_ACRONYM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(UN|NATO|EU|WHO|IMF|Fed|CIA|FBI|NSA|DOJ|OPEC|WTO|G7|G20|BRICS)\b").unwrap()
});

static COMPANY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(OpenAI|Google|Microsoft|Apple|Amazon|Meta|Facebook|Tesla|Nvidia|SpaceX|Twitter|X Corp|TikTok|ByteDance|Samsung|Intel|AMD|Anthropic|DeepMind)\b").unwrap()
});

static TITLED_PERSON_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:President|Prime Minister|CEO|PM)\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\b").unwrap()
});

static PERSON_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(Trump|Biden|Putin|Xi Jinping|Zelensky|Netanyahu|Musk|Bezos|Zuckerberg|Altman)\b").unwrap()
});

static CAPITALIZED_PHRASE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+\b").unwrap()
});

static NON_WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z0-9\s-]").unwrap()
});

/// Known-name patterns, in priority order
fn known_entity_patterns() -> [&'static Regex; 7] {
    [
        &COUNTRY_REGEX,
        &COUNTRY_ACRONYM_REGEX,
        &ORGANIZATION_REGEX,
        &ORGANIZATION_ACRONYM_REGEX,
        &COMPANY_REGEX,
        &TITLED_PERSON_REGEX,
        &PERSON_REGEX,
    ]
}

/// Helper to push a value once, preserving first-seen order
fn push_unique(out: &mut Vec<String>, seen: &mut HashSet<String>, value: &str) {
    let folded = value.trim().to_lowercase();
    if !folded.is_empty() && seen.insert(folded.clone()) {
        out.push(folded);
    }
}

/// Extract named-entity-like substrings from text, case-folded and deduplicated
pub fn extract_entities(text: &str) -> Vec<String> {
    let mut entities = Vec::new();
    let mut seen = HashSet::new();

    for pattern in known_entity_patterns() {
        for m in pattern.find_iter(text) {
            push_unique(&mut entities, &mut seen, m.as_str());
        }
    }

    for m in CAPITALIZED_PHRASE_REGEX.find_iter(text) {
        push_unique(&mut entities, &mut seen, m.as_str());
    }

    entities
}

/// Significant plain tokens: case-folded, punctuation stripped, at least
/// [`MIN_KEYWORD_LEN`] characters, not a stop word, not purely numeric
pub fn significant_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD_REGEX.replace_all(&lowered, " ");

    cleaned
        .split_whitespace()
        .map(|t| t.trim_matches('-'))
        .filter(|t| {
            t.chars().count() >= MIN_KEYWORD_LEN
                && !STOP_SET.contains(t)
                && !t.chars().all(|c| c.is_ascii_digit())
        })
        .map(str::to_string)
        .collect()
}

/// Keywords of a headline: entities first, then significant tokens.
/// Order is first occurrence; values are unique.
pub fn extract_keywords(title: &str) -> Vec<String> {
    let mut keywords = Vec::new();
    let mut seen = HashSet::new();

    for entity in extract_entities(title) {
        push_unique(&mut keywords, &mut seen, &entity);
    }
    for token in significant_tokens(title) {
        push_unique(&mut keywords, &mut seen, &token);
    }

    keywords
}

/// Jaccard similarity of two sets; 0 when either is empty
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = (a.len() + b.len()) as f64 - intersection;
    if union == 0.0 {
        0.0
    } else {
        intersection / union
    }
}

/// Words longer than three characters, used for topic overlap checks
pub fn topic_words(topic: &str) -> BTreeSet<String> {
    topic
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .map(str::to_string)
        .collect()
}

/// Uppercase the first character of a word
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Truncate to `max_chars` characters, appending "..." when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_known_entities() {
        let entities = extract_entities("NATO warns Russia over Ukraine grain corridor");
        assert!(entities.contains(&"nato".to_string()));
        assert!(entities.contains(&"russia".to_string()));
        assert!(entities.contains(&"ukraine".to_string()));
    }

    #[test]
    fn test_acronyms_are_case_sensitive() {
        let entities = extract_entities("Who told us about the fed up voters?");
        assert!(!entities.contains(&"us".to_string()));
        assert!(!entities.contains(&"who".to_string()));
        assert!(!entities.contains(&"fed".to_string()));

        let entities = extract_entities("US and UK sign deal as WHO watches");
        assert!(entities.contains(&"us".to_string()));
        assert!(entities.contains(&"uk".to_string()));
        assert!(entities.contains(&"who".to_string()));
    }

    #[test]
    fn test_titled_person_and_phrase() {
        let entities = extract_entities("talks stall as President Macron meets Central Bank Governor");
        assert!(entities.contains(&"president macron".to_string()));
        assert!(entities.contains(&"central bank governor".to_string()));
    }

    #[test]
    fn test_keywords_drop_short_and_stop_words() {
        let keywords = extract_keywords("the new tariff plan will hit 2024 steel and gas exports");
        assert!(keywords.contains(&"tariff".to_string()));
        assert!(keywords.contains(&"steel".to_string()));
        assert!(keywords.contains(&"exports".to_string()));
        // four characters is long enough
        assert!(keywords.contains(&"plan".to_string()));
        assert!(!keywords.contains(&"the".to_string()));
        assert!(!keywords.contains(&"gas".to_string()));
        assert!(!keywords.contains(&"hit".to_string()));
        assert!(!keywords.contains(&"2024".to_string()));
        assert!(!keywords.contains(&"will".to_string()));
    }

    #[test]
    fn test_keywords_strip_punctuation_and_dedupe() {
        let keywords = extract_keywords("Taiwan: taiwan's chips, Taiwan!");
        assert_eq!(keywords.iter().filter(|k| *k == "taiwan").count(), 1);
        assert!(keywords.contains(&"chips".to_string()));
    }

    #[test]
    fn test_jaccard() {
        let a: BTreeSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let b: BTreeSet<String> = ["b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert!((jaccard(&a, &b) - 0.5).abs() < 1e-9);
        assert_eq!(jaccard(&a, &BTreeSet::new()), 0.0);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("abc", 3), "abc");
    }
}
