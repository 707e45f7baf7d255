use std::cmp::Ordering;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::{
    plan::{RankingPlan, SortKey, SortOrder},
    Candidate, FieldValue,
};

/// Orders candidates by the plan's primary key, then its tie-breakers in list
/// order. Equal candidates keep their input order. Without a plan or primary
/// key the input order is returned unchanged.
pub fn rank(candidates: &[Candidate], plan: Option<&RankingPlan>) -> Vec<Candidate> {
    let Some((plan, primary)) = plan.and_then(|plan| plan.primary.as_ref().map(|primary| (plan, primary))) else {
        return candidates.to_vec();
    };

    let ordered = merge_sort_by(candidates.iter().collect(), &mut |a: &&Candidate, b: &&Candidate| {
        compare_with_tie_breakers(a, b, primary, &plan.tie_breakers)
    });
    ordered.into_iter().cloned().collect()
}

pub fn compare_with_tie_breakers(
    a: &Candidate,
    b: &Candidate,
    primary: &SortKey,
    tie_breakers: &[SortKey],
) -> Ordering {
    std::iter::once(primary)
        .chain(tie_breakers)
        .map(|key| compare(a, b, key))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Compares two candidates on one key.
///
/// An absent value defaults to `""` when the other side is text and to `0`
/// otherwise, so the default depends on the pair, not on the column.
pub fn compare(a: &Candidate, b: &Candidate, key: &SortKey) -> Ordering {
    let left = a.field(&key.field);
    let right = b.field(&key.field);
    let ordering = compare_values(or_default(left, right), or_default(right, left));

    match key.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

fn or_default<'a>(value: FieldValue<'a>, other: FieldValue<'a>) -> FieldValue<'a> {
    match (value, other) {
        (FieldValue::Absent, FieldValue::Text(_)) => FieldValue::Text(""),
        (FieldValue::Absent, _) => FieldValue::Number(0.0),
        (present, _) => present,
    }
}

fn compare_values(left: FieldValue<'_>, right: FieldValue<'_>) -> Ordering {
    match (left, right) {
        (FieldValue::Text(a), FieldValue::Text(b)) => collate(a, b),
        (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(&b),
        // mixed or numeric pairs: a side that does not coerce to a number compares equal
        (a, b) => match (a.to_number(), b.to_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

/// Locale-style text order: accents and case are ignored first, then a
/// lowercase letter sorts before its uppercase form, then raw text decides.
fn collate(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.chars().map(char::is_uppercase).cmp(b.chars().map(char::is_uppercase)))
        .then_with(|| a.cmp(b))
}

fn fold(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

// `slice::sort_by` may panic when the comparator is not a total order, which
// mixed-type columns can produce. Plain stable merge sort never does.
fn merge_sort_by<T, F>(mut items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort_by(items, compare);
    let right = merge_sort_by(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            _ => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }
    merged.extend(left);
    merged.extend(right);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64, years: f64, availability: f64, name: &str) -> Candidate {
        Candidate {
            id: Some(id),
            full_name: Some(name.into()),
            years_experience: Some(years),
            availability_weeks: Some(availability),
            ..Candidate::default()
        }
    }

    fn ids(candidates: &[Candidate]) -> Vec<i64> {
        candidates.iter().filter_map(|c| c.id).collect()
    }

    fn pool() -> Vec<Candidate> {
        vec![
            candidate(1, 8.0, 4.0, "Rowan"),
            candidate(2, 12.0, 2.0, "Chris"),
            candidate(3, 8.0, 2.0, "Jess"),
            candidate(4, 19.0, 10.0, "Quinn"),
            candidate(5, 8.0, 2.0, "alex"),
        ]
    }

    #[test]
    fn no_plan_or_primary_preserves_input_order() {
        assert_eq!(ids(&rank(&pool(), None)), vec![1, 2, 3, 4, 5]);
        assert_eq!(ids(&rank(&pool(), Some(&RankingPlan::default()))), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn descending_primary_keeps_ties_in_input_order() {
        let plan = RankingPlan::by(SortKey::desc("years_experience"));
        assert_eq!(ids(&rank(&pool(), Some(&plan))), vec![4, 2, 1, 3, 5]);
    }

    #[test]
    fn tie_breakers_apply_in_list_order() {
        let plan = RankingPlan::by(SortKey::desc("years_experience"))
            .then(SortKey::asc("availability_weeks"))
            .then(SortKey::asc("full_name"));
        assert_eq!(ids(&rank(&pool(), Some(&plan))), vec![4, 2, 5, 3, 1]);
    }

    #[test]
    fn text_collates_case_insensitively() {
        let plan = RankingPlan::by(SortKey::asc("full_name"));
        assert_eq!(ids(&rank(&pool(), Some(&plan))), vec![5, 2, 3, 4, 1]);
    }

    #[test]
    fn accented_names_sort_by_base_letter_lowercase_first() {
        let names = ["Zoe", "Élodie", "Frank", "a", "A"];
        let pool: Vec<Candidate> = names
            .iter()
            .enumerate()
            .map(|(i, name)| candidate(i as i64 + 1, 1.0, 1.0, name))
            .collect();
        let plan = RankingPlan::by(SortKey::asc("full_name"));
        let ranked: Vec<_> = rank(&pool, Some(&plan))
            .into_iter()
            .filter_map(|c| c.full_name)
            .collect();
        assert_eq!(ranked, vec!["a", "A", "Élodie", "Frank", "Zoe"]);
        assert_eq!(collate("Elodie", "Élodie"), Ordering::Less);
    }

    #[test]
    fn booleans_sort_false_first() {
        let mut pool = pool();
        pool[0].open_to_contract = Some(true);
        pool[1].open_to_contract = Some(false);
        pool[2].open_to_contract = Some(true);
        pool[3].open_to_contract = Some(false);
        pool[4].open_to_contract = Some(false);
        let plan = RankingPlan::by(SortKey::asc("open_to_contract"));
        assert_eq!(ids(&rank(&pool, Some(&plan))), vec![2, 4, 5, 1, 3]);
    }

    #[test]
    fn absent_values_default_against_their_pair() {
        let with_title = Candidate {
            id: Some(1),
            title: Some("Architect".into()),
            ..Candidate::default()
        };
        let without = Candidate {
            id: Some(2),
            ..Candidate::default()
        };
        let key = SortKey::asc("title");
        assert_eq!(compare(&without, &with_title, &key), Ordering::Less);
        assert_eq!(compare(&without, &without, &key), Ordering::Equal);

        let salaried = Candidate {
            desired_salary_usd: Some(-5.0),
            ..Candidate::default()
        };
        assert_eq!(
            compare(&without, &salaried, &SortKey::asc("desired_salary_usd")),
            Ordering::Greater
        );
    }

    #[test]
    fn mixed_types_compare_without_panicking() {
        let mut pool = pool();
        pool[0].extra.insert("score".into(), serde_json::json!("n/a"));
        pool[1].extra.insert("score".into(), serde_json::json!(3));
        pool[2].extra.insert("score".into(), serde_json::json!("10"));
        pool[3].extra.insert("score".into(), serde_json::json!(true));
        let plan = RankingPlan::by(SortKey::desc("score"));
        let ranked = rank(&pool, Some(&plan));
        assert_eq!(ranked.len(), 5);
        assert_eq!(rank(&pool, Some(&plan)), ranked);
    }
}
