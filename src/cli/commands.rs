//! CLI command implementations
//!
//! Commands are one-shot: read a request, decide, write one response.
//! No catalog state survives the process.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::PolystoreConfig;
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry};
use crate::partition::partition_manager_by_name;
use crate::routing::{
    CandidatePlan, MemoryDebugSink, PostCostStore, RoutingPlanSelector, TransactionContext,
};

use super::args::Command;
use super::errors::CliResult;
use super::io::{read_request, write_error, write_response};

/// Request accepted by `polystore select`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectRequest {
    pub plans: Vec<CandidatePlan>,
    pub costs: Vec<f64>,
    /// Observed execution time per physical query class
    #[serde(default)]
    pub history: BTreeMap<String, f64>,
    /// Include the intermediate cost vectors in the response
    #[serde(default)]
    pub analyze: bool,
}

/// Parse arguments and run the command.
///
/// The only function `main` calls.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    let name = match &cmd {
        Command::Select { .. } => "select",
        Command::Settings { .. } => "settings",
    };
    log_event_with_fields(Event::CommandStart, &[("command", name)]);

    let outcome = match cmd {
        Command::Select { config } => {
            load_config(config.as_deref()).and_then(|config| {
                let request: SelectRequest = read_request()?;
                select(&config, &request)
            })
        }
        Command::Settings { scheme } => settings(&scheme),
    };

    match outcome {
        Ok(data) => {
            write_response(data)?;
            log_event_with_fields(Event::CommandComplete, &[("command", name)]);
            Ok(())
        }
        Err(err) => {
            log_event_with_fields(
                Event::CommandFailed,
                &[("code", err.code_str()), ("command", name)],
            );
            write_error(&err)?;
            Err(err)
        }
    }
}

fn load_config(path: Option<&Path>) -> CliResult<PolystoreConfig> {
    let config = match path {
        Some(path) => PolystoreConfig::load(path)?,
        None => PolystoreConfig::default(),
    };
    Logger::set_min_severity(config.log_severity()?);
    Ok(config)
}

/// Select one plan for `request` under `config`.
pub fn select(config: &PolystoreConfig, request: &SelectRequest) -> CliResult<Value> {
    let routing = config.routing_config()?;
    let monitoring = Arc::new(PostCostStore::from_history(
        request.history.iter().map(|(class, ms)| (class.clone(), *ms)),
    ));
    let metrics = Arc::new(MetricsRegistry::new());

    let selector = match config.rng_seed {
        Some(seed) => RoutingPlanSelector::with_seed(routing, monitoring, seed)?,
        None => RoutingPlanSelector::new(routing, monitoring)?,
    }
    .with_metrics(Arc::clone(&metrics));

    let sink = MemoryDebugSink::new();
    let tx = if request.analyze {
        TransactionContext::analyzing(&sink)
    } else {
        TransactionContext::new()
    };

    let index = selector.select_index(&request.plans, &request.costs, &tx)?;
    let plan = &request.plans[index];

    let mut data = json!({
        "index": index,
        "selected": plan.id,
        "physical_query_class": plan.physical_query_class,
    });
    if request.analyze {
        data["debug"] = serde_json::to_value(sink.last())?;
        data["metrics"] = serde_json::to_value(metrics.snapshot())?;
    }
    Ok(data)
}

/// Settings schema of the named partition scheme.
pub fn settings(scheme: &str) -> CliResult<Value> {
    let manager = partition_manager_by_name(scheme)?;
    Ok(serde_json::to_value(manager.settings())?)
}
