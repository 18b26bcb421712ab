use clap::Args;
use serde_json::{json, Value};

use fin_model_core::assumptions::ScenarioAssumptions;
use fin_model_core::engine::{self, RunStatus};

use crate::input;

/// Arguments for a full scenario run
#[derive(Args)]
pub struct RunArgs {
    /// Path to a JSON scenario-assumptions file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_scenario(args: RunArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions: ScenarioAssumptions = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <scenario.json> or stdin required for a scenario run".into());
    };

    let outcome = engine::run_scenario(&assumptions);

    if outcome.report.status == RunStatus::Failed {
        let message = outcome
            .report
            .error_message
            .clone()
            .unwrap_or_else(|| "unknown error".into());
        return Err(format!(
            "calculation failed for '{}': {message}",
            outcome.report.scenario_name
        )
        .into());
    }

    let records = outcome
        .results
        .as_ref()
        .map(|r| r.to_records())
        .unwrap_or_default();

    Ok(json!({
        "report": outcome.report,
        "records": records,
    }))
}
