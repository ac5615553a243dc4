//! Recently-used topic filter

use scout_core::topic_words;

/// Share of significant words above which two topics count as the same
pub const OVERLAP_THRESHOLD: f64 = 0.5;

/// Whether `topic` repeats one of `used`: an exact case-insensitive match,
/// or more than half the significant words of the smaller topic shared
pub fn is_topic_used(topic: &str, used: &[String]) -> bool {
    let normalized = topic.trim().to_lowercase();
    let words = topic_words(&normalized);

    used.iter().any(|previous| {
        let previous = previous.trim().to_lowercase();
        if previous == normalized {
            return true;
        }

        let previous_words = topic_words(&previous);
        if words.is_empty() || previous_words.is_empty() {
            return false;
        }

        let overlap = words.intersection(&previous_words).count() as f64;
        overlap / words.len().min(previous_words.len()) as f64 > OVERLAP_THRESHOLD
    })
}

/// Keep items whose topic has not been used
pub fn filter_unused<T, F>(items: Vec<T>, used: &[String], topic_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    if used.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| !is_topic_used(topic_of(item), used))
        .collect()
}
