pub mod field;
pub mod logging;
pub mod matching;
pub mod plan;
pub mod query;
pub mod run_id;
pub mod synonyms;
pub mod table;

use serde::{Deserialize, Serialize};

pub use field::{FieldKind, FieldValue, KNOWN_FIELDS};
pub use matching::stats::Stats;
pub use plan::{Criterion, FieldCriteria, FilterPlan, ProcessingPlans, RankingPlan, SortKey, SortOrder};
pub use synonyms::Synonyms;

// Candidate row as loaded from the talent table. Known columns are typed,
// anything else lands in `extra` in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidate {
    pub id: Option<i64>,
    pub full_name: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub timezone: Option<String>,
    pub years_experience: Option<f64>,
    /// `;` separated, e.g. `"Rust;Kafka;React"`
    pub skills: Option<String>,
    pub languages: Option<String>,
    pub education_level: Option<String>,
    pub degree_major: Option<String>,
    pub availability_weeks: Option<f64>,
    pub willing_to_relocate: Option<bool>,
    pub work_preference: Option<String>,
    pub notice_period_weeks: Option<f64>,
    pub desired_salary_usd: Option<f64>,
    pub open_to_contract: Option<bool>,
    pub remote_experience_years: Option<f64>,
    pub visa_status: Option<String>,
    pub citizenships: Option<String>,
    pub summary: Option<String>,
    /// `,` separated, e.g. `"data,machine-learning,cloud"`
    pub tags: Option<String>,
    pub last_active: Option<String>,
    pub linkedin_url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
