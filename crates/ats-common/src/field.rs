//! Uniform, typed access to candidate fields by name.
//!
//! Plans address fields by their column name (`"years_experience"`,
//! `"skills"`, or any extension column). `Candidate::field` resolves the typed
//! struct first and falls back to the extension map, so filter and ranking code
//! can dispatch on [`FieldValue`] without caring where the value lives.

use serde_json::Value;
use strum::AsRefStr;

use crate::Candidate;

/// A single candidate value as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    Bool(bool),
    Absent,
}

impl<'a> FieldValue<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// JSON `null`, arrays and objects have no scalar reading and are treated as absent.
    pub fn from_json(value: &'a Value) -> Self {
        match value {
            Value::String(s) => FieldValue::Text(s),
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(FieldValue::Absent, FieldValue::Number),
            Value::Null | Value::Array(_) | Value::Object(_) => FieldValue::Absent,
        }
    }

    /// Number coercion with JavaScript `Number()` semantics: blank text is 0,
    /// booleans are 1/0, unparsable text is `None`. Text accepts `Infinity`
    /// spelled exactly and unsigned `0x`/`0o`/`0b` literals.
    pub fn to_number(&self) -> Option<f64> {
        let n = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Bool(b) => f64::from(u8::from(*b)),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    parse_numeric_text(trimmed)?
                }
            }
            FieldValue::Absent => return None,
        };
        (!n.is_nan()).then_some(n)
    }
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    match text {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &text[2..];
        if digits.starts_with('+') {
            return None;
        }
        return u128::from_str_radix(digits, radix).ok().map(|n| n as f64);
    }

    // std also reads "inf" and "infinity" in any case
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl<'a> From<Option<&'a String>> for FieldValue<'a> {
    fn from(value: Option<&'a String>) -> Self {
        value.map_or(FieldValue::Absent, |s| FieldValue::Text(s))
    }
}

impl From<Option<f64>> for FieldValue<'_> {
    fn from(value: Option<f64>) -> Self {
        value.map_or(FieldValue::Absent, FieldValue::Number)
    }
}

impl From<Option<bool>> for FieldValue<'_> {
    fn from(value: Option<bool>) -> Self {
        value.map_or(FieldValue::Absent, FieldValue::Bool)
    }
}

/// Declared type of a known column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Bool,
}

pub const KNOWN_FIELDS: &[(&str, FieldKind)] = &[
    ("id", FieldKind::Number),
    ("full_name", FieldKind::Text),
    ("title", FieldKind::Text),
    ("location", FieldKind::Text),
    ("timezone", FieldKind::Text),
    ("years_experience", FieldKind::Number),
    ("skills", FieldKind::Text),
    ("languages", FieldKind::Text),
    ("education_level", FieldKind::Text),
    ("degree_major", FieldKind::Text),
    ("availability_weeks", FieldKind::Number),
    ("willing_to_relocate", FieldKind::Bool),
    ("work_preference", FieldKind::Text),
    ("notice_period_weeks", FieldKind::Number),
    ("desired_salary_usd", FieldKind::Number),
    ("open_to_contract", FieldKind::Bool),
    ("remote_experience_years", FieldKind::Number),
    ("visa_status", FieldKind::Text),
    ("citizenships", FieldKind::Text),
    ("summary", FieldKind::Text),
    ("tags", FieldKind::Text),
    ("last_active", FieldKind::Text),
    ("linkedin_url", FieldKind::Text),
];

pub fn known_field_kind(name: &str) -> Option<FieldKind> {
    KNOWN_FIELDS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, kind)| *kind)
}

impl Candidate {
    /// Looks up a field by column name: typed columns first, then `extra`.
    pub fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "id" => self.id.map_or(FieldValue::Absent, |id| FieldValue::Number(id as f64)),
            "full_name" => self.full_name.as_ref().into(),
            "title" => self.title.as_ref().into(),
            "location" => self.location.as_ref().into(),
            "timezone" => self.timezone.as_ref().into(),
            "years_experience" => self.years_experience.into(),
            "skills" => self.skills.as_ref().into(),
            "languages" => self.languages.as_ref().into(),
            "education_level" => self.education_level.as_ref().into(),
            "degree_major" => self.degree_major.as_ref().into(),
            "availability_weeks" => self.availability_weeks.into(),
            "willing_to_relocate" => self.willing_to_relocate.into(),
            "work_preference" => self.work_preference.as_ref().into(),
            "notice_period_weeks" => self.notice_period_weeks.into(),
            "desired_salary_usd" => self.desired_salary_usd.into(),
            "open_to_contract" => self.open_to_contract.into(),
            "remote_experience_years" => self.remote_experience_years.into(),
            "visa_status" => self.visa_status.as_ref().into(),
            "citizenships" => self.citizenships.as_ref().into(),
            "summary" => self.summary.as_ref().into(),
            "tags" => self.tags.as_ref().into(),
            "last_active" => self.last_active.as_ref().into(),
            "linkedin_url" => self.linkedin_url.as_ref().into(),
            _ => self
                .extra
                .get(name)
                .map_or(FieldValue::Absent, FieldValue::from_json),
        }
    }
}

/// Splits a raw `skills` value into trimmed, non-empty tokens.
pub fn split_skills(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';').map(str::trim).filter(|s| !s.is_empty())
}

/// Splits a raw `tags` value. Tags are comma separated in the source table, but
/// planners sometimes mirror the skills convention, so `;` is accepted too.
pub fn split_tags(raw: &str) -> impl Iterator<Item = &str> {
    raw.split([',', ';']).map(str::trim).filter(|s| !s.is_empty())
}

/// Tokenizes a multi-value column by name; `None` for single-valued columns.
pub fn split_multi_value<'a>(field: &str, raw: &'a str) -> Option<Vec<&'a str>> {
    match field {
        "skills" => Some(split_skills(raw).collect()),
        "tags" => Some(split_tags(raw).collect()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Candidate {
        let mut extra = serde_json::Map::new();
        extra.insert("github_stars".into(), serde_json::json!(120));
        extra.insert("referral".into(), serde_json::json!(null));
        Candidate {
            id: Some(7),
            title: Some("Backend Engineer".into()),
            years_experience: Some(12.0),
            willing_to_relocate: Some(false),
            extra,
            ..Candidate::default()
        }
    }

    #[test]
    fn typed_fields_take_precedence_over_extra() {
        let c = candidate();
        assert_eq!(c.field("id"), FieldValue::Number(7.0));
        assert_eq!(c.field("title"), FieldValue::Text("Backend Engineer"));
        assert_eq!(c.field("willing_to_relocate"), FieldValue::Bool(false));
        assert_eq!(c.field("location"), FieldValue::Absent);
    }

    #[test]
    fn extension_fields_resolve_from_side_table() {
        let c = candidate();
        assert_eq!(c.field("github_stars"), FieldValue::Number(120.0));
        assert!(c.field("referral").is_absent());
        assert!(c.field("unknown_column").is_absent());
    }

    #[test]
    fn number_coercion_follows_js_rules() {
        assert_eq!(FieldValue::Text(" 12 ").to_number(), Some(12.0));
        assert_eq!(FieldValue::Text("").to_number(), Some(0.0));
        assert_eq!(FieldValue::Text("twelve").to_number(), None);
        assert_eq!(FieldValue::Bool(true).to_number(), Some(1.0));
        assert_eq!(FieldValue::Absent.to_number(), None);
    }

    #[test]
    fn infinity_and_radix_literals_follow_js_spelling() {
        assert_eq!(FieldValue::Text("inf").to_number(), None);
        assert_eq!(FieldValue::Text("infinity").to_number(), None);
        assert_eq!(FieldValue::Text("INFINITY").to_number(), None);
        assert_eq!(FieldValue::Text(" Infinity ").to_number(), Some(f64::INFINITY));
        assert_eq!(FieldValue::Text("-Infinity").to_number(), Some(f64::NEG_INFINITY));
        assert_eq!(FieldValue::Text("0x10").to_number(), Some(16.0));
        assert_eq!(FieldValue::Text("0b101").to_number(), Some(5.0));
        assert_eq!(FieldValue::Text("0o17").to_number(), Some(15.0));
        assert_eq!(FieldValue::Text("-0x10").to_number(), None);
        assert_eq!(FieldValue::Text("0x").to_number(), None);
        assert_eq!(FieldValue::Text("1e3").to_number(), Some(1000.0));
    }

    #[test]
    fn multi_value_splitting_trims_and_drops_empty_tokens() {
        assert_eq!(
            split_skills(" Rust ;Kafka;; React;").collect::<Vec<_>>(),
            vec!["Rust", "Kafka", "React"]
        );
        assert_eq!(
            split_tags("data, machine-learning ,cloud").collect::<Vec<_>>(),
            vec!["data", "machine-learning", "cloud"]
        );
        assert_eq!(split_multi_value("title", "a;b"), None);
    }

    #[test]
    fn known_field_kinds_cover_struct_columns() {
        assert_eq!(known_field_kind("open_to_contract"), Some(FieldKind::Bool));
        assert_eq!(known_field_kind("desired_salary_usd"), Some(FieldKind::Number));
        assert_eq!(known_field_kind("github_stars"), None);
        assert_eq!(FieldKind::Number.as_ref(), "number");
    }
}
