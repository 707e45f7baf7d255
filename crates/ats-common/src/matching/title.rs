const FRONTEND_KEYWORDS: &[&str] = &["frontend", "front-end", "front end"];
const BACKEND_KEYWORDS: &[&str] = &["backend", "back-end", "back end"];
const FULLSTACK_KEYWORDS: &[&str] = &["fullstack", "full-stack", "full stack"];
const ROLE_KEYWORDS: &[&str] = &["engineer", "developer"];

/// Roles recognised by [`extract_role`], checked in this order.
pub const ROLE_VOCABULARY: &[&str] = &[
    "engineer",
    "developer",
    "architect",
    "specialist",
    "designer",
    "manager",
    "lead",
    "analyst",
    "scientist",
    "administrator",
    "devops",
    "sre",
    "qa",
    "tester",
];

/// First role of [`ROLE_VOCABULARY`] contained in `title` (expected lower-cased).
pub fn extract_role(title: &str) -> Option<&'static str> {
    ROLE_VOCABULARY.iter().copied().find(|role| title.contains(role))
}

fn has_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Does a candidate's title satisfy the query title?
///
/// Strict mode keeps frontend/backend/fullstack queries inside their own
/// family, so "Frontend Engineer" never matches "Backend Engineer" on the
/// shared role word. A strict query with no family keyword matches nothing but
/// exact equality. Lenient mode is plain containment in either direction.
pub fn match_title(candidate_title: &str, query_title: &str, strict: bool) -> bool {
    let candidate = candidate_title.trim().to_lowercase();
    let query = query_title.trim().to_lowercase();

    if candidate == query {
        return true;
    }

    if !strict {
        return candidate.contains(&query) || query.contains(&candidate);
    }

    let families = [FRONTEND_KEYWORDS, BACKEND_KEYWORDS, FULLSTACK_KEYWORDS];
    let mut family_matched = false;
    for keywords in families {
        let query_has = has_any(&query, keywords);
        let candidate_has = has_any(&candidate, keywords);
        if query_has && !candidate_has {
            return false;
        }
        family_matched |= query_has && candidate_has;
    }

    if has_any(&query, ROLE_KEYWORDS) && !has_any(&candidate, ROLE_KEYWORDS) {
        return false;
    }

    family_matched
}
