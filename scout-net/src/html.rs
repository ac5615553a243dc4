//! Markup stripping for feed titles and descriptions

use scraper::node::Node;
use scraper::Html;

/// Maximum characters kept from a description
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Extract visible text from an HTML fragment
pub fn strip_html(fragment: &str) -> String {
    if !fragment.contains('<') && !fragment.contains('&') {
        return normalize_whitespace(fragment);
    }

    let document = Html::parse_fragment(fragment);
    let mut parts = Vec::new();

    for node_ref in document.root_element().descendants() {
        if let Node::Text(text_node) = node_ref.value() {
            let in_excluded = node_ref.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map(|el| matches!(el.name(), "script" | "style"))
                    .unwrap_or(false)
            });

            if !in_excluded {
                let trimmed = text_node.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
        }
    }

    normalize_whitespace(&parts.join(" "))
}

/// Strip markup and cap at [`MAX_DESCRIPTION_CHARS`]
pub fn clean_description(raw: &str) -> Option<String> {
    let text = strip_html(raw);
    if text.is_empty() {
        None
    } else {
        Some(text.chars().take(MAX_DESCRIPTION_CHARS).collect())
    }
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        let html = "<p>Talks <b>resume</b> in Geneva</p><script>track()</script>";
        assert_eq!(strip_html(html), "Talks resume in Geneva");
    }

    #[test]
    fn test_plain_text_passthrough() {
        assert_eq!(strip_html("  plain   text "), "plain text");
    }

    #[test]
    fn test_clean_description_truncates() {
        let long = format!("<div>{}</div>", "x".repeat(500));
        let cleaned = clean_description(&long).unwrap();
        assert_eq!(cleaned.chars().count(), MAX_DESCRIPTION_CHARS);
        assert_eq!(clean_description("<br/>"), None);
    }
}
