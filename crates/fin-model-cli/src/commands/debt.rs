use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use fin_model_core::assumptions::{CapitalExpenditure, DebtFinancing, TimelineAssumptions};
use fin_model_core::periods;
use fin_model_core::schedule::debt::project_debt;
use fin_model_core::types::{SeriesRecord, StatementCategory};

use crate::input;

/// Arguments for a standalone debt schedule
#[derive(Args)]
pub struct DebtScheduleArgs {
    /// Path to a JSON file with timeline, debt, and CAPEX terms
    #[arg(long)]
    pub input: Option<String>,
}

/// Subset of the scenario bundle a debt schedule needs.
#[derive(Debug, Serialize, Deserialize)]
pub struct DebtScheduleRequest {
    pub timeline: TimelineAssumptions,
    pub debt_financing: DebtFinancing,
    pub capital_expenditure: CapitalExpenditure,
}

pub fn run_debt_schedule(args: DebtScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: DebtScheduleRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <terms.json> or stdin required for a debt schedule".into());
    };

    let timeline = periods::generate_periods(&request.timeline)?;
    let schedule = project_debt(
        &request.debt_financing,
        &request.capital_expenditure,
        &timeline,
        request.timeline.construction_start_year(),
        request.timeline.operations_start_year(),
    )?;

    let items = [
        ("Opening Balance", &schedule.opening_balance),
        ("Drawdowns", &schedule.drawdowns),
        ("Principal Repayment", &schedule.principal_repayment),
        ("Interest Expense", &schedule.interest_expense),
        ("Closing Balance", &schedule.closing_balance),
    ];
    let records: Vec<SeriesRecord> = items
        .iter()
        .map(|(label, series)| {
            SeriesRecord::from_series(StatementCategory::DebtSchedule, label, &timeline, series)
        })
        .collect();

    Ok(json!({
        "total_debt": schedule.total_debt,
        "records": records,
    }))
}
