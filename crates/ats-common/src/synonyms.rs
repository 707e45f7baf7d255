use std::sync::LazyLock;

/// Canonical term → accepted variants, in declaration order.
///
/// Lookups are substring based: `"senior react.js dev"` contains the variant
/// `"react.js"` of the canonical `"react"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymTable {
    entries: Vec<(String, Vec<String>)>,
}

impl SynonymTable {
    pub fn new<C, V>(entries: impl IntoIterator<Item = (C, V)>) -> Self
    where
        C: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(canonical, variants)| {
                    (
                        canonical.into().to_lowercase(),
                        variants.into_iter().map(|v| v.into().to_lowercase()).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(canonical, variants)| (canonical.as_str(), variants.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when one side contains a canonical term and the other contains one
    /// of its variants. Both inputs are expected lower-cased.
    pub fn links(&self, a: &str, b: &str) -> bool {
        self.entries.iter().any(|(canonical, variants)| {
            let contains_variant = |s: &str| variants.iter().any(|v| s.contains(v.as_str()));
            (a.contains(canonical.as_str()) && contains_variant(b))
                || (b.contains(canonical.as_str()) && contains_variant(a))
        })
    }
}

/// Vocabulary consulted by the semantic matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Synonyms {
    pub titles: SynonymTable,
    pub skills: SynonymTable,
}

impl Synonyms {
    pub fn new(titles: SynonymTable, skills: SynonymTable) -> Self {
        Self { titles, skills }
    }

    /// Shared instance of the shipped vocabulary.
    pub fn builtin() -> &'static Synonyms {
        &BUILTIN
    }

    pub fn links(&self, a: &str, b: &str) -> bool {
        self.titles.links(a, b) || self.skills.links(a, b)
    }
}

// NOTE: planner prompts advertise the same equivalences ("ML" = "Machine
// Learning", "React" = "ReactJS"); keep both sides in sync.
static BUILTIN: LazyLock<Synonyms> = LazyLock::new(|| {
    let titles: &[(&str, &[&str])] = &[
        ("engineer", &["developer", "programmer", "coder", "swe", "dev"]),
        ("developer", &["engineer", "programmer", "coder", "swe", "dev"]),
        ("machine learning", &["ml", "ai", "artificial intelligence"]),
        ("frontend", &["front end", "front-end", "ui", "client-side"]),
        ("backend", &["back end", "back-end", "server-side"]),
        ("full stack", &["fullstack", "full-stack"]),
        ("devops", &["dev ops", "dev-ops", "operations"]),
        ("product", &["product development", "product management"]),
    ];

    let skills: &[(&str, &[&str])] = &[
        ("react", &["reactjs", "react.js"]),
        ("node", &["nodejs", "node.js"]),
        ("javascript", &["js", "ecmascript"]),
        ("typescript", &["ts"]),
        ("python", &["py"]),
        ("machine learning", &["ml"]),
        ("artificial intelligence", &["ai"]),
        ("aws", &["amazon web services"]),
        ("gcp", &["google cloud", "google cloud platform"]),
        ("azure", &["microsoft azure"]),
    ];

    Synonyms::new(
        SynonymTable::new(titles.iter().map(|(c, v)| (*c, v.iter().copied()))),
        SynonymTable::new(skills.iter().map(|(c, v)| (*c, v.iter().copied()))),
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_in_both_directions() {
        let synonyms = Synonyms::builtin();
        assert!(synonyms.links("ml engineer", "machine learning"));
        assert!(synonyms.links("machine learning", "ml engineer"));
        assert!(synonyms.links("reactjs", "react"));
    }

    #[test]
    fn unrelated_terms_do_not_link() {
        let synonyms = Synonyms::builtin();
        assert!(!synonyms.links("kafka", "spring"));
    }

    #[test]
    fn custom_tables_replace_builtin_vocabulary() {
        let synonyms = Synonyms::new(
            SynonymTable::new([("Postgres", ["PG"])]),
            SynonymTable::default(),
        );
        assert!(synonyms.links("postgres", "pg admin"));
        assert!(!synonyms.links("reactjs", "react"));
        assert!(synonyms.skills.is_empty());
        assert_eq!(synonyms.titles.entries().count(), 1);
    }
}
