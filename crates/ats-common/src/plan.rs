//! Filter and ranking plans as produced by the external query planner.
//!
//! The planner answers with JSON of the shape
//!
//! ```json
//! {
//!   "filter": { "include": { "skills": "React", "years_experience": { "min": 3 } },
//!               "exclude": { "visa_status": "Needs Sponsorship" } },
//!   "rank": { "primary": { "field": "years_experience", "order": "desc" },
//!             "tie_breakers": [ { "field": "availability_weeks", "order": "asc" } ] }
//! }
//! ```
//!
//! or `{"isConversational": true}` for greetings. Criterion values are
//! polymorphic on the wire and are resolved into [`Criterion`] once here, so
//! the filter never re-inspects raw JSON.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use strum::AsRefStr;
use thiserror::Error;
use tracing::warn;

use crate::FieldValue;

static RE_CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)```").expect("code fence pattern is valid"));

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("planner response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid plan structure: {0}")]
    InvalidStructure(&'static str),
}

/// Scalar entry of a list criterion.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Literal {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Literal::Text(s.clone())),
            Value::Number(n) => n.as_f64().map(Literal::Number),
            Value::Bool(b) => Some(Literal::Bool(*b)),
            _ => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Literal::Text(s) => Value::String(s.clone()),
            Literal::Number(n) => Value::from(*n),
            Literal::Bool(b) => Value::Bool(*b),
        }
    }

    /// Strict (same type, same value) equality against a candidate value.
    pub fn strictly_equals(&self, value: FieldValue<'_>) -> bool {
        match (self, value) {
            (Literal::Text(a), FieldValue::Text(b)) => a == b,
            (Literal::Number(a), FieldValue::Number(b)) => a == &b,
            (Literal::Bool(a), FieldValue::Bool(b)) => *a == b,
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// What a plan asks of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Text(String),
    /// Acceptable values; any one may match.
    List(Vec<Literal>),
    /// Inclusive numeric bounds.
    Range { min: Option<f64>, max: Option<f64> },
    Bool(bool),
    Number(f64),
}

impl Criterion {
    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Criterion::Range { min, max }
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Criterion::List(values.into_iter().map(|v| Literal::Text(v.into())).collect())
    }

    /// `None` for shapes no filter branch can use (`null`, nested arrays only, ...).
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Criterion::Text(s.clone())),
            Value::Bool(b) => Some(Criterion::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Criterion::Number),
            Value::Array(items) => Some(Criterion::List(
                items.iter().filter_map(Literal::from_json).collect(),
            )),
            Value::Object(bounds) => Some(Criterion::Range {
                min: bounds.get("min").and_then(json_bound),
                max: bounds.get("max").and_then(json_bound),
            }),
            Value::Null => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Criterion::Text(s) => Value::String(s.clone()),
            Criterion::List(items) => Value::Array(items.iter().map(Literal::to_json).collect()),
            Criterion::Range { min, max } => {
                let mut bounds = Map::new();
                if let Some(min) = min {
                    bounds.insert("min".into(), Value::from(*min));
                }
                if let Some(max) = max {
                    bounds.insert("max".into(), Value::from(*max));
                }
                Value::Object(bounds)
            }
            Criterion::Bool(b) => Value::Bool(*b),
            Criterion::Number(n) => Value::from(*n),
        }
    }
}

fn json_bound(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Field → criterion, in plan order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldCriteria {
    entries: Vec<(String, Criterion)>,
}

impl FieldCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; a repeated field replaces the earlier criterion.
    pub fn with(mut self, field: impl Into<String>, criterion: Criterion) -> Self {
        self.insert(field, criterion);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, criterion: Criterion) {
        let field = field.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = criterion,
            None => self.entries.push((field, criterion)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Criterion> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, criterion)| criterion)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Criterion)> {
        self.entries.iter().map(|(name, criterion)| (name.as_str(), criterion))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Criterion)> for FieldCriteria {
    fn from_iter<T: IntoIterator<Item = (K, Criterion)>>(iter: T) -> Self {
        let mut criteria = FieldCriteria::new();
        for (field, criterion) in iter {
            criteria.insert(field, criterion);
        }
        criteria
    }
}

impl<'de> Deserialize<'de> for FieldCriteria {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let mut criteria = FieldCriteria::new();
        for (field, value) in &raw {
            match Criterion::from_json(value) {
                Some(criterion) => criteria.insert(field.as_str(), criterion),
                None => warn!(field = %field, value = %value, "skipping criterion with unusable shape"),
            }
        }
        Ok(criteria)
    }
}

impl Serialize for FieldCriteria {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(field, criterion)| (field.clone(), criterion.to_json()))
            .collect();
        map.serialize(serializer)
    }
}

/// Include criteria are ANDed, exclude criteria are ORed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<FieldCriteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<FieldCriteria>,
}

impl FilterPlan {
    pub fn including(include: FieldCriteria) -> Self {
        Self {
            include: Some(include),
            exclude: None,
        }
    }

    pub fn excluding(mut self, exclude: FieldCriteria) -> Self {
        self.exclude = Some(exclude);
        self
    }

    /// Neither side present: the plan keeps every candidate.
    pub fn is_noop(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }

    pub fn has_title_criterion(&self) -> bool {
        self.include.as_ref().is_some_and(|include| include.contains("title"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only `"desc"` sorts descending; surrounding whitespace and ASCII case
    /// are ignored.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(SortOrder::parse).unwrap_or_default())
    }
}

impl Serialize for SortOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortKey {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

/// Primary ordering plus tie-breakers consulted in list order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingPlan {
    #[serde(default)]
    pub primary: Option<SortKey>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tie_breakers: Vec<SortKey>,
}

impl RankingPlan {
    pub fn by(primary: SortKey) -> Self {
        Self {
            primary: Some(primary),
            tie_breakers: Vec::new(),
        }
    }

    pub fn then(mut self, tie_breaker: SortKey) -> Self {
        self.tie_breakers.push(tie_breaker);
        self
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Filter and ranking plans for one recruiter query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingPlans {
    pub filter: FilterPlan,
    pub rank: RankingPlan,
    #[serde(default, rename = "isConversational")]
    pub is_conversational: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanResponse {
    /// The planner judged the message a greeting or too vague to filter on.
    Conversational,
    Plans(ProcessingPlans),
}

/// Strips a markdown code fence around the planner's JSON, if any.
pub fn extract_json_payload(content: &str) -> &str {
    RE_CODE_FENCE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| content.trim(), |m| m.as_str().trim())
}

/// Parses a raw planner response into plans.
pub fn parse_processing_plans(content: &str) -> Result<PlanResponse, PlanError> {
    let value: Value = serde_json::from_str(extract_json_payload(content))?;
    let Value::Object(mut object) = value else {
        return Err(PlanError::InvalidStructure("expected a JSON object"));
    };

    if object.get("isConversational").and_then(Value::as_bool) == Some(true) {
        return Ok(PlanResponse::Conversational);
    }

    let filter = take_present(&mut object, "filter")
        .ok_or(PlanError::InvalidStructure("missing filter plan"))?;
    let rank = take_present(&mut object, "rank")
        .ok_or(PlanError::InvalidStructure("missing rank plan"))?;

    Ok(PlanResponse::Plans(ProcessingPlans {
        filter: serde_json::from_value(filter)?,
        rank: serde_json::from_value(rank)?,
        is_conversational: false,
    }))
}

fn take_present(object: &mut Map<String, Value>, key: &str) -> Option<Value> {
    object.remove(key).filter(|value| !value.is_null())
}
