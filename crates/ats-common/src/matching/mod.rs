pub mod filter;
pub mod pipeline;
pub mod ranking;
pub mod semantic;
pub mod stats;
pub mod title;

pub use filter::{CandidateFilter, FilterOptions, FilterOutcome, FilterPass};
pub use pipeline::{QueryEngine, QueryOptions, QueryOutcome, SummaryInput};
pub use ranking::rank;
pub use semantic::{MatchOptions, SemanticMatcher};
pub use stats::{aggregate, Stats};
