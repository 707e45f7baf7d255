use std::path::PathBuf;

use ats_common::{
    logging::{init_tracing_subscriber, install_tracing_panic_hook},
    matching::{QueryEngine, QueryOptions},
    plan::{parse_processing_plans, PlanError, PlanResponse},
    run_id,
    table::{load_candidates_from_path, TableError},
};
use clap::Parser;
use dotenvy::dotenv;
use serde_json::json;
use tracing::{info, info_span};

const APP_NAME: &str = "ats-query";

#[derive(Debug, Parser)]
#[command(
    name = "ats-query",
    about = "Filter and rank a candidate table with a planner's processing plans"
)]
struct Cli {
    /// JSON array of candidate rows
    #[arg(long, env = "ATS_CANDIDATES")]
    candidates: PathBuf,

    /// Planner response holding `filter` and `rank` (code fences allowed)
    #[arg(long, env = "ATS_PLAN")]
    plan: PathBuf,

    /// The recruiter's message; drives the result limit and salary heuristic
    #[arg(long, default_value = "")]
    query: String,

    /// Force flexible matching on or off instead of inferring it from the query
    #[arg(long, env = "ATS_FLEXIBLE_MATCHING")]
    flexible_matching: Option<bool>,

    /// Candidates included in the summary context
    #[arg(long, env = "ATS_SUMMARY_TOP_N", default_value_t = 5)]
    summary_top_n: usize,

    /// Log every per-field filter decision at debug level
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Debug, thiserror::Error)]
enum QueryCliError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("failed to read plan {path}: {source}")]
    ReadPlan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("failed to encode result: {0}")]
    Json(#[from] serde_json::Error),
}

impl Cli {
    fn options(&self) -> QueryOptions {
        QueryOptions {
            flexible_matching: self.flexible_matching,
            summary_top_n: self.summary_top_n,
            debug: self.debug,
        }
    }
}

fn execute(cli: &Cli) -> Result<String, QueryCliError> {
    let candidates = load_candidates_from_path(&cli.candidates)?;
    let raw_plan = std::fs::read_to_string(&cli.plan).map_err(|source| QueryCliError::ReadPlan {
        path: cli.plan.clone(),
        source,
    })?;

    let value = match parse_processing_plans(&raw_plan)? {
        PlanResponse::Conversational => {
            info!("planner flagged the message as conversational; nothing to filter");
            json!({ "conversational": true })
        }
        PlanResponse::Plans(plans) => {
            let outcome = QueryEngine::default().run(&cli.query, &candidates, &plans, cli.options());
            serde_json::to_value(outcome)?
        }
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(rendered)
}

fn run() -> Result<(), QueryCliError> {
    dotenv().ok();
    init_tracing_subscriber(APP_NAME);
    install_tracing_panic_hook(APP_NAME);

    let cli = Cli::parse();
    let span = info_span!("ats_query", run_id = run_id::get());
    let _entered = span.enter();

    println!("{}", execute(&cli)?);
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{APP_NAME} failed: {err}");
        std::process::exit(1);
    }
}
