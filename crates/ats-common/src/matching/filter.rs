use serde::{Deserialize, Serialize};
use strum::AsRefStr;
use tracing::{debug, info};

use super::{
    semantic::{MatchOptions, SemanticMatcher},
    title::match_title,
};
use crate::{
    field::split_multi_value,
    plan::{Criterion, FilterPlan, Literal},
    Candidate, FieldValue, Synonyms,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Allow the lenient pass: as a fallback for empty strict title results,
    /// or as the only pass when the plan has no title criterion.
    pub flexible_matching: bool,
    /// Emit one `debug` event per candidate with every field decision.
    pub debug: bool,
}

/// Which evaluation produced a filter result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterPass {
    /// No plan, or a plan without include/exclude.
    Unfiltered,
    Strict,
    Lenient,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub candidates: Vec<Candidate>,
    pub pass: FilterPass,
    /// A strict title pass came back empty and the lenient pass ran.
    pub fell_back: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Include,
    Exclude,
}

pub struct CandidateFilter<'s> {
    matcher: SemanticMatcher<'s>,
}

impl Default for CandidateFilter<'static> {
    fn default() -> Self {
        Self::new(Synonyms::builtin())
    }
}

impl<'s> CandidateFilter<'s> {
    pub fn new(synonyms: &'s Synonyms) -> Self {
        Self {
            matcher: SemanticMatcher::new(synonyms),
        }
    }

    /// Filters with the strict-first policy and returns the surviving candidates.
    pub fn filter(
        &self,
        candidates: &[Candidate],
        plan: Option<&FilterPlan>,
        options: FilterOptions,
    ) -> Vec<Candidate> {
        self.filter_with_outcome(candidates, plan, options).candidates
    }

    /// Title criteria are tried strictly first; the lenient pass runs only when
    /// that yields nothing and flexible matching is on. Plans without a title
    /// criterion run once, strict unless flexible matching is on.
    pub fn filter_with_outcome(
        &self,
        candidates: &[Candidate],
        plan: Option<&FilterPlan>,
        options: FilterOptions,
    ) -> FilterOutcome {
        let Some(plan) = plan.filter(|plan| !plan.is_noop()) else {
            return FilterOutcome {
                candidates: candidates.to_vec(),
                pass: FilterPass::Unfiltered,
                fell_back: false,
            };
        };

        if !plan.has_title_criterion() {
            let (strict, pass) = if options.flexible_matching {
                (false, FilterPass::Lenient)
            } else {
                (true, FilterPass::Strict)
            };
            let matched = self.evaluate(candidates, plan, strict, options.debug);
            info!(
                pass = pass.as_ref(),
                total = candidates.len(),
                matched = matched.len(),
                "filtered candidates"
            );
            return FilterOutcome {
                candidates: matched,
                pass,
                fell_back: false,
            };
        }

        let strict = self.evaluate(candidates, plan, true, options.debug);
        info!(
            pass = FilterPass::Strict.as_ref(),
            total = candidates.len(),
            matched = strict.len(),
            "filtered candidates on title"
        );
        if !strict.is_empty() || !options.flexible_matching {
            return FilterOutcome {
                candidates: strict,
                pass: FilterPass::Strict,
                fell_back: false,
            };
        }

        let lenient = self.evaluate(candidates, plan, false, options.debug);
        info!(
            pass = FilterPass::Lenient.as_ref(),
            total = candidates.len(),
            matched = lenient.len(),
            "strict title match was empty; retried leniently"
        );
        FilterOutcome {
            candidates: lenient,
            pass: FilterPass::Lenient,
            fell_back: true,
        }
    }

    /// Single pass over `candidates` with a fixed strictness.
    pub fn evaluate(
        &self,
        candidates: &[Candidate],
        plan: &FilterPlan,
        strict: bool,
        debug: bool,
    ) -> Vec<Candidate> {
        candidates
            .iter()
            .filter(|candidate| self.accepts(candidate, plan, strict, debug))
            .cloned()
            .collect()
    }

    /// Every include field must match and no exclude field may match.
    pub fn accepts(&self, candidate: &Candidate, plan: &FilterPlan, strict: bool, debug: bool) -> bool {
        let mut decisions = debug.then(Vec::new);

        let included = plan.include.as_ref().map_or(true, |include| {
            include.iter().all(|(field, criterion)| {
                let matched = self.field_matches(candidate, field, criterion, strict, Side::Include);
                if let Some(decisions) = decisions.as_mut() {
                    decisions.push((Side::Include, field, matched));
                }
                matched
            })
        });

        let excluded = plan.exclude.as_ref().is_some_and(|exclude| {
            exclude.iter().any(|(field, criterion)| {
                let matched = self.field_matches(candidate, field, criterion, strict, Side::Exclude);
                if let Some(decisions) = decisions.as_mut() {
                    decisions.push((Side::Exclude, field, matched));
                }
                matched
            })
        });

        if let Some(decisions) = decisions {
            debug!(
                candidate_id = ?candidate.id,
                strict,
                included,
                excluded,
                fields = ?decisions,
                "filter decision"
            );
        }

        included && !excluded
    }

    fn field_matches(
        &self,
        candidate: &Candidate,
        field: &str,
        criterion: &Criterion,
        strict: bool,
        side: Side,
    ) -> bool {
        let value = candidate.field(field);
        if value.is_absent() {
            return false;
        }

        if field == "title" {
            let Some(title) = value.as_text() else {
                return false;
            };
            return match criterion {
                Criterion::Text(query) => match_title(title, query, strict),
                Criterion::List(queries) => queries
                    .iter()
                    .filter_map(Literal::as_text)
                    .any(|query| match_title(title, query, strict)),
                _ => false,
            };
        }

        match criterion {
            Criterion::List(items) => match value {
                FieldValue::Text(text) => match split_multi_value(field, text) {
                    Some(tokens) => items
                        .iter()
                        .filter_map(Literal::as_text)
                        .any(|wanted| self.any_token_matches(&tokens, wanted, field, strict)),
                    None => items.iter().any(|item| item.as_text() == Some(text)),
                },
                other => items.iter().any(|item| item.strictly_equals(other)),
            },
            Criterion::Text(wanted) => {
                let FieldValue::Text(text) = value else {
                    return false;
                };
                if let Some(tokens) = split_multi_value(field, text) {
                    self.any_token_matches(&tokens, wanted, field, strict)
                } else if field == "location" {
                    self.matcher.matches_str(text, wanted, MatchOptions::default())
                } else {
                    text.to_lowercase() == wanted.to_lowercase()
                }
            }
            Criterion::Range { min, max } => {
                let Some(number) = value.to_number() else {
                    return false;
                };
                let below = min.is_some_and(|min| number < min);
                let above = max.is_some_and(|max| number > max);
                match side {
                    Side::Include => !below && !above,
                    Side::Exclude => below || above,
                }
            }
            Criterion::Bool(wanted) => value == FieldValue::Bool(*wanted),
            Criterion::Number(wanted) => value == FieldValue::Number(*wanted),
        }
    }

    fn any_token_matches(&self, tokens: &[&str], wanted: &str, field: &str, strict: bool) -> bool {
        let options = MatchOptions {
            exact: strict,
            field_type: field,
        };
        tokens
            .iter()
            .any(|token| self.matcher.matches_str(token, wanted, options))
    }
}
