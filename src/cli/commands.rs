//! CLI command implementations
//!
//! Both commands read one request, validate the catalog and filter, rate
//! indexes (unless told the filter is already rated), run the enumerator
//! and print a single JSON response.

use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::observability::Logger;
use crate::planner::{
    rate_indices, EnumeratorConfig, EnumeratorError, IndexCatalog, IndexEntry, MatchExpr,
    PlanEnumerator, Tag,
};

use super::args::{Command, RequestArgs};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_response};

/// Request body: `{"catalog": [...], "filter": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    pub catalog: Vec<IndexEntry>,
    pub filter: MatchExpr,
}

impl PlanRequest {
    pub fn from_value(value: Value) -> CliResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Parse arguments and run
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Plan(args) => plan(&args),
        Command::Explain(args) => explain(&args),
    }
}

/// Print the tagged plan
pub fn plan(args: &RequestArgs) -> CliResult<()> {
    let (config, request) = load(args)?;
    write_response(plan_request(request, config, args.skip_rating)?)
}

/// Print memo and assignments
pub fn explain(args: &RequestArgs) -> CliResult<()> {
    let (config, request) = load(args)?;
    write_response(explain_request(request, config, args.skip_rating)?)
}

fn load(args: &RequestArgs) -> CliResult<(EnumeratorConfig, PlanRequest)> {
    let config = load_config(args.config.as_deref())?;
    let severity = config
        .log_severity()
        .map_err(|e| CliError::config_error(e.message()))?;
    Logger::set_min_severity(severity);

    let request = PlanRequest::from_value(read_request(args.input.as_deref())?)?;
    Ok((config, request))
}

/// Load the configuration file, or defaults when none is given
pub fn load_config(path: Option<&Path>) -> CliResult<EnumeratorConfig> {
    match path {
        Some(path) => EnumeratorConfig::load(path).map_err(|e| CliError::config_error(e.message())),
        None => Ok(EnumeratorConfig::default()),
    }
}

/// Enumerate and return `{"plan": <tree or null>}`
pub fn plan_request(
    request: PlanRequest,
    config: EnumeratorConfig,
    skip_rating: bool,
) -> CliResult<Value> {
    let catalog = IndexCatalog::new(request.catalog).map_err(EnumeratorError::from)?;
    let filter = prepare_filter(request.filter, &catalog, skip_rating)?;

    let mut enumerator = PlanEnumerator::with_config(filter, &catalog, config);
    let plan = enumerator.produce_next();
    Ok(json!({ "plan": plan }))
}

/// Enumerate and return the explain output
pub fn explain_request(
    request: PlanRequest,
    config: EnumeratorConfig,
    skip_rating: bool,
) -> CliResult<Value> {
    let catalog = IndexCatalog::new(request.catalog).map_err(EnumeratorError::from)?;
    let filter = prepare_filter(request.filter, &catalog, skip_rating)?;

    let mut enumerator = PlanEnumerator::with_config(filter, &catalog, config);
    let plan = enumerator.produce_next();
    let explain = enumerator.explain(plan.as_ref());
    Ok(serde_json::to_value(explain)?)
}

/// Validates the filter and makes sure it carries relevance tags only
fn prepare_filter(
    mut filter: MatchExpr,
    catalog: &IndexCatalog,
    skip_rating: bool,
) -> CliResult<MatchExpr> {
    filter.validate()?;

    if !skip_rating {
        filter.clear_tags();
        rate_indices(&mut filter, catalog);
        return Ok(filter);
    }

    let mut problem = None;
    filter.walk(&mut |at, node| {
        if problem.is_some() {
            return;
        }
        match &node.tag {
            Tag::Empty => {}
            Tag::Assigned(_) => {
                problem = Some(format!("node {} already carries an index assignment", at));
            }
            Tag::Relevant(rt) => {
                if let Some(id) = rt.first.iter().chain(&rt.not_first).find(|&&id| id >= catalog.len()) {
                    problem = Some(format!("node {} refers to unknown index {}", at, id));
                } else if rt.first.iter().any(|id| rt.not_first.contains(id)) {
                    problem = Some(format!("node {} lists an index as both first and notFirst", at));
                }
            }
        }
    });

    match problem {
        Some(reason) => Err(CliError::invalid_request(reason)),
        None => Ok(filter),
    }
}
