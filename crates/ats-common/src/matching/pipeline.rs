use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use super::{
    filter::{CandidateFilter, FilterOptions, FilterPass},
    ranking::rank,
    stats::{aggregate, Stats},
};
use crate::{
    query::{flexible_matching_for, requested_count},
    run_id, Candidate, ProcessingPlans, Synonyms,
};

pub const DEFAULT_SUMMARY_TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Overrides the salary heuristic when set.
    pub flexible_matching: Option<bool>,
    /// Candidates handed to the summarizer, taken from the full ranked list.
    pub summary_top_n: usize,
    pub debug: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            flexible_matching: None,
            summary_top_n: DEFAULT_SUMMARY_TOP_N,
            debug: false,
        }
    }
}

/// What the summarizer gets to see about one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryInput {
    pub query: String,
    pub stats: Stats,
    pub top_candidates: Vec<Candidate>,
}

impl SummaryInput {
    /// One line per top candidate:
    /// `7. Chris Evans - Backend Engineer (Nicosia, Cyprus, 12 years experience)`.
    pub fn digest(&self) -> String {
        self.top_candidates
            .iter()
            .map(|c| {
                format!(
                    "{}. {} - {} ({}, {} years experience)",
                    c.id.map_or_else(|| "?".to_string(), |id| id.to_string()),
                    c.full_name.as_deref().unwrap_or("unknown"),
                    c.title.as_deref().unwrap_or("unknown"),
                    c.location.as_deref().unwrap_or("unknown"),
                    c.years_experience.unwrap_or(0.0),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub run_id: String,
    pub query_id: String,
    pub generated_at: DateTime<Utc>,
    pub query: String,
    pub flexible_matching: bool,
    pub filter_pass: FilterPass,
    pub fell_back: bool,
    pub requested_count: Option<usize>,
    /// Size of the ranked set before the requested-count limit.
    pub total_matches: usize,
    pub ranked: Vec<Candidate>,
    /// Computed over all matches, not only the returned ones.
    pub stats: Stats,
    pub summary: SummaryInput,
}

/// Filter → rank → aggregate for one recruiter query.
pub struct QueryEngine<'s> {
    filter: CandidateFilter<'s>,
}

impl Default for QueryEngine<'static> {
    fn default() -> Self {
        Self::new(Synonyms::builtin())
    }
}

impl<'s> QueryEngine<'s> {
    pub fn new(synonyms: &'s Synonyms) -> Self {
        Self {
            filter: CandidateFilter::new(synonyms),
        }
    }

    pub fn run(
        &self,
        query: &str,
        candidates: &[Candidate],
        plans: &ProcessingPlans,
        options: QueryOptions,
    ) -> QueryOutcome {
        let query_id = run_id::generate();
        let span = info_span!("query", run_id = run_id::get(), query_id = %query_id);
        let _entered = span.enter();

        let flexible_matching = options
            .flexible_matching
            .unwrap_or_else(|| flexible_matching_for(query, &plans.filter));

        let filtered = self.filter.filter_with_outcome(
            candidates,
            Some(&plans.filter),
            FilterOptions {
                flexible_matching,
                debug: options.debug,
            },
        );
        let mut ranked = rank(&filtered.candidates, Some(&plans.rank));

        let stats = aggregate(&ranked);
        let total_matches = ranked.len();
        let summary = SummaryInput {
            query: query.to_string(),
            stats: stats.clone(),
            top_candidates: ranked.iter().take(options.summary_top_n).cloned().collect(),
        };

        let requested = requested_count(query);
        if let Some(limit) = requested.filter(|&n| n > 0 && n < total_matches) {
            ranked.truncate(limit);
        }

        info!(
            flexible_matching,
            pass = filtered.pass.as_ref(),
            fell_back = filtered.fell_back,
            total_matches,
            returned = ranked.len(),
            "query processed"
        );

        QueryOutcome {
            run_id: run_id::get().to_string(),
            query_id,
            generated_at: Utc::now(),
            query: query.to_string(),
            flexible_matching,
            filter_pass: filtered.pass,
            fell_back: filtered.fell_back,
            requested_count: requested,
            total_matches,
            ranked,
            stats,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Criterion, FieldCriteria, FilterPlan, RankingPlan, SortKey};

    fn base_candidate(id: i64, name: &str, title: &str, location: &str, years: f64, skills: &str) -> Candidate {
        Candidate {
            id: Some(id),
            full_name: Some(name.into()),
            title: Some(title.into()),
            location: Some(location.into()),
            years_experience: Some(years),
            skills: Some(skills.into()),
            ..Candidate::default()
        }
    }

    fn table() -> Vec<Candidate> {
        vec![
            base_candidate(12, "Quinn Lee", "Machine Learning Engineer", "Berlin, Germany", 19.0, "Python;PyTorch"),
            base_candidate(8, "Rowan Price", "Cloud Architect", "Limassol, Cyprus", 8.0, "React;Terraform"),
            base_candidate(7, "Chris Evans", "Backend Engineer", "Nicosia, Cyprus", 12.0, "Java;React;AWS"),
        ]
    }

    fn react_in_cyprus() -> ProcessingPlans {
        ProcessingPlans {
            filter: FilterPlan::including(
                FieldCriteria::new()
                    .with("skills", Criterion::Text("React".into()))
                    .with("location", Criterion::Text("Cyprus".into())),
            ),
            rank: RankingPlan::by(SortKey::desc("years_experience")),
            is_conversational: false,
        }
    }

    fn ids(candidates: &[Candidate]) -> Vec<i64> {
        candidates.iter().filter_map(|c| c.id).collect()
    }

    #[test]
    fn filters_then_ranks_by_plan() {
        let options = QueryOptions {
            flexible_matching: Some(true),
            ..QueryOptions::default()
        };
        let outcome = QueryEngine::default().run("React devs in Cyprus", &table(), &react_in_cyprus(), options);

        assert_eq!(ids(&outcome.ranked), vec![7, 8]);
        assert_eq!(outcome.filter_pass, FilterPass::Lenient);
        assert_eq!(outcome.total_matches, 2);
        assert_eq!(outcome.run_id, run_id::get());
        assert_eq!(outcome.stats.avg_experience, 10.0);
        assert_eq!(outcome.stats.top_skills, vec!["React", "Java", "AWS", "Terraform"]);
    }

    #[test]
    fn requested_count_limits_results_but_not_stats_or_summary() {
        let outcome = QueryEngine::default().run(
            "show me the top 1 React dev in Cyprus",
            &table(),
            &react_in_cyprus(),
            QueryOptions::default(),
        );

        assert_eq!(outcome.requested_count, Some(1));
        assert_eq!(ids(&outcome.ranked), vec![7]);
        assert_eq!(outcome.total_matches, 2);
        assert_eq!(outcome.stats.count, 2);
        assert_eq!(ids(&outcome.summary.top_candidates), vec![7, 8]);
    }

    #[test]
    fn salary_queries_turn_on_flexible_matching() {
        let engine = QueryEngine::default();
        let plans = react_in_cyprus();

        let salary = engine.run("React in Cyprus, lowest salary", &table(), &plans, QueryOptions::default());
        assert!(salary.flexible_matching);

        let plain = engine.run("React in Cyprus", &table(), &plans, QueryOptions::default());
        assert!(!plain.flexible_matching);
        assert_eq!(plain.filter_pass, FilterPass::Strict);
    }

    #[test]
    fn summary_digest_lists_top_candidates() {
        let options = QueryOptions {
            flexible_matching: Some(true),
            summary_top_n: 1,
            ..QueryOptions::default()
        };
        let outcome = QueryEngine::default().run("React devs in Cyprus", &table(), &react_in_cyprus(), options);

        assert_eq!(
            outcome.summary.digest(),
            "7. Chris Evans - Backend Engineer (Nicosia, Cyprus, 12 years experience)"
        );
        assert_eq!(outcome.summary.query, "React devs in Cyprus");
    }

    #[test]
    fn outcome_serializes_with_snake_case_pass() {
        let outcome = QueryEngine::default().run("anyone", &table(), &ProcessingPlans::default(), QueryOptions::default());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["filter_pass"], "unfiltered");
        assert_eq!(json["total_matches"], 3);
        assert_eq!(ids(&outcome.ranked), vec![12, 8, 7]);
    }
}
