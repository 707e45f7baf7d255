use super::title::extract_role;
use crate::synonyms::Synonyms;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions<'a> {
    /// Require equivalence instead of containment/synonym tolerance.
    pub exact: bool,
    /// Column being matched (`"title"`, `"skills"`, `"tags"`, ...); selects the exact rule.
    pub field_type: &'a str,
}

impl<'a> MatchOptions<'a> {
    pub fn exact(field_type: &'a str) -> Self {
        Self {
            exact: true,
            field_type,
        }
    }

    pub fn lenient(field_type: &'a str) -> Self {
        Self {
            exact: false,
            field_type,
        }
    }
}

/// Tolerant string equivalence shared by titles, skills, tags and location.
#[derive(Debug, Clone, Copy)]
pub struct SemanticMatcher<'s> {
    synonyms: &'s Synonyms,
}

impl Default for SemanticMatcher<'static> {
    fn default() -> Self {
        Self::new(Synonyms::builtin())
    }
}

impl<'s> SemanticMatcher<'s> {
    pub fn new(synonyms: &'s Synonyms) -> Self {
        Self { synonyms }
    }

    /// True if `target` is equivalent to any of `sources`.
    pub fn matches<S: AsRef<str>>(&self, target: &str, sources: &[S], options: MatchOptions<'_>) -> bool {
        let target = target.to_lowercase();
        sources
            .iter()
            .any(|source| self.matches_one(&target, &source.as_ref().to_lowercase(), options))
    }

    /// Single-source form of [`SemanticMatcher::matches`].
    pub fn matches_str(&self, target: &str, source: &str, options: MatchOptions<'_>) -> bool {
        self.matches(target, &[source], options)
    }

    fn matches_one(&self, target: &str, source: &str, options: MatchOptions<'_>) -> bool {
        if options.exact {
            return match options.field_type {
                "title" => exact_title_match(target, source),
                "skills" => exact_skill_match(target, source),
                _ => target == source,
            };
        }

        if target.contains(source) || source.contains(target) {
            return true;
        }

        // compound titles: any significant word of the target found in the source
        if target
            .split_whitespace()
            .any(|part| part.chars().count() > 2 && source.contains(part))
        {
            return true;
        }

        self.synonyms.links(source, target)
    }
}

fn exact_title_match(target: &str, source: &str) -> bool {
    if let (Some(source_role), Some(target_role)) = (extract_role(source), extract_role(target)) {
        if source_role == target_role {
            return true;
        }
    }

    // "<specialty> ... <role>": both the leading and trailing words must appear
    let words: Vec<&str> = target.split_whitespace().collect();
    if let (Some(first), Some(last)) = (words.first(), words.last()) {
        if last.chars().count() > 5
            && source.contains(last)
            && first.chars().count() > 3
            && source.contains(first)
        {
            return true;
        }
    }

    target == source
}

fn exact_skill_match(target: &str, source: &str) -> bool {
    target == source
        || target.replacen('.', "", 1) == source.replacen('.', "", 1)
        || target.replacen(".js", "", 1) == source.replacen(".js", "", 1)
}
