use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{field::split_skills, Candidate};

const TOP_SKILLS: usize = 5;

/// Summary numbers over a candidate set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub count: usize,
    /// Mean `years_experience`, one decimal. Missing values count as 0.
    pub avg_experience: f64,
    /// Most frequent skill tokens, most frequent first.
    pub top_skills: Vec<String>,
}

pub fn aggregate(candidates: &[Candidate]) -> Stats {
    if candidates.is_empty() {
        return Stats::default();
    }

    let total: f64 = candidates
        .iter()
        .map(|candidate| candidate.years_experience.unwrap_or(0.0))
        .sum();
    let avg_experience = round_to_tenth(total / candidates.len() as f64);

    Stats {
        count: candidates.len(),
        avg_experience,
        top_skills: top_skills(candidates, TOP_SKILLS),
    }
}

/// Rounds the exact binary value, so a mean stored as 1.4499… gives 1.4.
/// Only a product that is exactly representable can be a true tie; those go
/// away from zero.
fn round_to_tenth(value: f64) -> f64 {
    let scaled = value * 10.0;
    let exact = value.mul_add(10.0, -scaled) == 0.0;
    if exact && scaled.fract().abs() == 0.5 {
        return scaled.round() / 10.0;
    }
    format!("{value:.1}").parse().unwrap_or(value)
}

fn top_skills(candidates: &[Candidate], limit: usize) -> Vec<String> {
    // first-appearance order; the stable sort below keeps it for equal counts
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for skill in candidates
        .iter()
        .filter_map(|candidate| candidate.skills.as_deref())
        .flat_map(split_skills)
    {
        match index.get(skill) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(skill, counts.len());
                counts.push((skill, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(skill, _)| skill.to_string())
        .collect()
}
