//! Rule-based career recommender.
//!
//! Matches interest terms against the static knowledge base by lowercase
//! substring containment. When phrase extraction produced nothing, the raw
//! canonical text is tokenized on whitespace so the recommender still has
//! terms to work with.

pub mod knowledge_base;

use tracing::debug;

use knowledge_base::{KnowledgeBaseEntry, KNOWLEDGE_BASE};

pub const NO_MATCH_MESSAGE: &str =
    "No specific matches found. Try adding more detailed interests.";

/// Produces rendered recommendations for the given interest phrases.
///
/// Falls back to whitespace tokens of `canonical_text` when `phrases` is
/// empty. Always returns at least one line: real matches, or the no-match
/// sentinel.
pub fn recommend_careers(phrases: &[String], canonical_text: &str) -> Vec<String> {
    let terms: Vec<String> = if phrases.is_empty() {
        tokenize(canonical_text)
    } else {
        phrases.iter().map(|p| p.to_lowercase()).collect()
    };

    let matched = match_entries(&terms);
    debug!(
        terms = terms.len(),
        matches = matched.len(),
        "rule-based recommendation completed"
    );

    if matched.is_empty() {
        return vec![NO_MATCH_MESSAGE.to_string()];
    }
    matched.into_iter().map(render_entry).collect()
}

/// Scans entries per term, deduplicating by key while preserving the order
/// in which entries first matched.
fn match_entries(terms: &[String]) -> Vec<&'static KnowledgeBaseEntry> {
    let mut matched: Vec<&'static KnowledgeBaseEntry> = Vec::new();

    for term in terms {
        for entry in KNOWLEDGE_BASE {
            if term.contains(entry.key) && !matched.iter().any(|m| m.key == entry.key) {
                matched.push(entry);
            }
        }
    }

    matched
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

fn render_entry(entry: &KnowledgeBaseEntry) -> String {
    format!(
        "{}: {}. {}",
        entry.title,
        entry.careers.join(", "),
        entry.summary
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_phrase_containing_key_matches() {
        let lines = recommend_careers(&phrases(&["data analysis workflows"]), "");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Data Careers:"));
        assert!(lines[0].contains("Data Science"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let lines = recommend_careers(&phrases(&["Machine Learning research"]), "");
        assert!(lines.iter().any(|l| l.starts_with("Machine Learning:")));
    }

    #[test]
    fn test_repeated_key_renders_once() {
        let lines = recommend_careers(
            &phrases(&["data pipelines", "data warehousing", "big data"]),
            "",
        );
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Data Careers:"));
    }

    #[test]
    fn test_first_match_order_is_preserved() {
        let lines = recommend_careers(&phrases(&["robotics club", "biology lab"]), "");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Robotics:"));
        assert!(lines[1].starts_with("Life Sciences:"));
    }

    #[test]
    fn test_empty_phrases_fall_back_to_raw_tokens() {
        let lines = recommend_careers(&[], "I love biology and genetics");
        assert!(lines.iter().any(|l| l.starts_with("Life Sciences:")));
    }

    #[test]
    fn test_no_match_returns_sentinel() {
        let lines = recommend_careers(&phrases(&["watercolor techniques"]), "");
        assert_eq!(lines, vec![NO_MATCH_MESSAGE.to_string()]);
    }

    #[test]
    fn test_short_key_matches_inside_longer_words() {
        // Containment is deliberate: "ai" hides inside "painting".
        let lines = recommend_careers(&phrases(&["poster painting"]), "");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Artificial Intelligence:"));
    }

    #[test]
    fn test_empty_input_returns_sentinel() {
        let lines = recommend_careers(&[], "   ");
        assert_eq!(lines, vec![NO_MATCH_MESSAGE.to_string()]);
    }

    #[test]
    fn test_distinct_keys_render_distinct_entries() {
        let lines = recommend_careers(&phrases(&["leadership", "strategy"]), "");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Leadership & Management:"));
        assert!(lines[1].starts_with("Strategy:"));
    }

    #[test]
    fn test_recommendation_is_idempotent() {
        let input = phrases(&["electronics hobbyist", "robotics"]);
        let first = recommend_careers(&input, "");
        let second = recommend_careers(&input, "");
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_format() {
        let entry = &KNOWLEDGE_BASE[0];
        let line = render_entry(entry);
        assert_eq!(
            line,
            format!(
                "{}: {}. {}",
                entry.title,
                entry.careers.join(", "),
                entry.summary
            )
        );
    }
}
