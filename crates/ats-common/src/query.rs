//! Heuristics read straight off the recruiter's message.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::FilterPlan;

static RE_REQUESTED_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:get|give|show|find|return|limit)\s+(?:me\s+)?(?:the\s+)?(?:top\s+)?(\d+|one|two|three|four|five|six|seven|eight|nine|ten)\b",
    )
    .expect("requested count pattern is valid")
});

const NUMBER_WORDS: &[(&str, usize)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

/// Result size the recruiter asked for, e.g. "show me the top 3" or "find five".
pub fn requested_count(query: &str) -> Option<usize> {
    let raw = RE_REQUESTED_COUNT.captures(query)?.get(1)?.as_str();
    if let Ok(n) = raw.parse::<usize>() {
        return Some(n);
    }

    let word = raw.to_ascii_lowercase();
    NUMBER_WORDS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, n)| *n)
}

/// Salary questions relax matching so budget filters don't starve on exact
/// skill spelling, unless the plan pins a title.
pub fn flexible_matching_for(query: &str, plan: &FilterPlan) -> bool {
    !plan.has_title_criterion() && query.to_lowercase().contains("salary")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Criterion, FieldCriteria};

    #[test]
    fn digits_and_number_words_are_recognised() {
        assert_eq!(requested_count("Show me the top 3 backend engineers"), Some(3));
        assert_eq!(requested_count("give me five React devs in Cyprus"), Some(5));
        assert_eq!(requested_count("FIND 12 data scientists"), Some(12));
        assert_eq!(requested_count("limit Ten"), Some(10));
    }

    #[test]
    fn count_needs_a_leading_verb() {
        assert_eq!(requested_count("top 3 engineers"), None);
        assert_eq!(requested_count("engineers with 5 years"), None);
        assert_eq!(requested_count("show me 3rd shift workers"), None);
        assert_eq!(requested_count("show me eleven"), None);
    }

    #[test]
    fn zero_is_reported_as_asked() {
        assert_eq!(requested_count("return 0 candidates"), Some(0));
    }

    #[test]
    fn flexible_only_for_salary_queries_without_title() {
        let no_title = FilterPlan::including(FieldCriteria::new().with("skills", Criterion::Text("Go".into())));
        let titled = FilterPlan::including(
            FieldCriteria::new().with("title", Criterion::Text("Backend Engineer".into())),
        );

        assert!(flexible_matching_for("Go devs with lower SALARY", &no_title));
        assert!(!flexible_matching_for("Go devs in Berlin", &no_title));
        assert!(!flexible_matching_for("backend engineers by salary", &titled));
        assert!(flexible_matching_for("cheapest salary", &FilterPlan::default()));
    }
}
