use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::assumptions::ScenarioAssumptions;
use crate::error::FinModelError;
use crate::periods;
use crate::ratios::{calculate_ratios, RatioSet};
use crate::schedule::capex::{self, CapexSchedule};
use crate::schedule::debt::{self, DebtSchedule};
use crate::schedule::depreciation::{self, DepreciationSchedule};
use crate::schedule::opex::{self, OpexSchedule};
use crate::schedule::revenue::{self, RevenueSchedule};
use crate::statements::{
    build_balance_sheet, build_cash_flow_statement, build_income_statement, verify_balance,
    BalanceSheet, CashFlowStatement, IncomeStatement,
};
use crate::types::{SeriesRecord, StatementCategory, Timeline};
use crate::valuation::{calculate_valuation, Valuation};

/// Lifecycle of a calculation run: pending → running → success | failed.
/// The terminal states are final; a new run supersedes, never resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Success,
    Failed,
}

/// Audit record for one run: outcome, size, timing, and every degraded-path
/// warning. On failure it carries the error display string plus the full
/// debug rendering as the trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario_name: String,
    pub status: RunStatus,
    pub periods_calculated: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_us: u64,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

/// Everything a successful run computed, indexed by one shared timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResults {
    pub timeline: Timeline,
    pub revenue: RevenueSchedule,
    pub operating_expenses: OpexSchedule,
    pub depreciation: DepreciationSchedule,
    pub capital_expenditure: CapexSchedule,
    pub debt: DebtSchedule,
    pub income_statement: IncomeStatement,
    pub cash_flow: CashFlowStatement,
    pub balance_sheet: BalanceSheet,
    pub ratios: RatioSet,
    pub valuation: Valuation,
}

/// Outcome of one run. `results` is present only on success: a failed run
/// keeps nothing, so the caller always persists all-or-nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub report: RunReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ScenarioResults>,
}

/// Execute a full scenario calculation: periods, the five schedules, the
/// three statements, the balance check, ratios, and valuation.
///
/// A scheduler that rejects its sub-assumptions is replaced by a zero
/// schedule and recorded in the warnings; the run continues. The only fatal
/// error is a balance-sheet invariant violation, which discards every
/// computed series. The engine assumes the caller serializes runs per
/// scenario; it performs no locking of its own.
pub fn run_scenario(assumptions: &ScenarioAssumptions) -> RunOutcome {
    let started_at = Utc::now();
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let timeline = match periods::generate_periods(&assumptions.timeline) {
        Ok(timeline) => timeline,
        Err(e) => {
            warnings.push(format!(
                "Period generation failed ({e}); substituting the fallback window of {} years from {}",
                periods::FALLBACK_YEARS,
                periods::FALLBACK_BASE_YEAR,
            ));
            periods::fallback_timeline()
        }
    };
    let n = timeline.len();

    let construction_start_year = assumptions.timeline.construction_start_year();
    let operations_start_year = assumptions.timeline.operations_start_year();

    if assumptions.revenue_products.is_empty() {
        warnings.push("No revenue products configured; revenue is zero".into());
    }

    // Leaf schedulers: independent of one another, each degradable to a
    // zero schedule without aborting the run
    let revenue = revenue::project_revenue(&assumptions.revenue_products, &timeline)
        .unwrap_or_else(|e| {
            warnings.push(format!("Revenue schedule failed ({e}); substituting zero series"));
            RevenueSchedule::zeroed(n)
        });

    let operating_expenses = opex::project_opex(
        &assumptions.operating_expenses,
        &assumptions.macro_assumptions,
        &timeline,
    )
    .unwrap_or_else(|e| {
        warnings.push(format!(
            "Operating expense schedule failed ({e}); substituting zero series"
        ));
        OpexSchedule::zeroed(n)
    });

    let depreciation_schedule = depreciation::project_depreciation(
        &assumptions.depreciation_schedules,
        &timeline,
        operations_start_year,
    )
    .unwrap_or_else(|e| {
        warnings.push(format!(
            "Depreciation schedule failed ({e}); substituting zero series"
        ));
        DepreciationSchedule::zeroed(n)
    });

    let capital_expenditure = capex::project_capex(
        &assumptions.capital_expenditure,
        &timeline,
        construction_start_year,
    )
    .unwrap_or_else(|e| {
        warnings.push(format!("CAPEX schedule failed ({e}); substituting zero series"));
        CapexSchedule::zeroed(n)
    });

    let debt_schedule = debt::project_debt(
        &assumptions.debt_financing,
        &assumptions.capital_expenditure,
        &timeline,
        construction_start_year,
        operations_start_year,
    )
    .unwrap_or_else(|e| {
        warnings.push(format!("Debt schedule failed ({e}); substituting zero series"));
        DebtSchedule::zeroed(n)
    });

    // Statement assembly requires every schedule to be complete
    let income_statement = build_income_statement(
        &revenue,
        &operating_expenses,
        &depreciation_schedule,
        &debt_schedule,
        &assumptions.tax,
        &timeline,
    );
    let cash_flow = build_cash_flow_statement(
        &income_statement,
        &capital_expenditure,
        &debt_schedule,
        &timeline,
    );
    let balance_sheet = build_balance_sheet(
        &income_statement,
        &cash_flow,
        &capital_expenditure,
        &debt_schedule,
    );

    if let Err(e) = verify_balance(&balance_sheet, &timeline) {
        return failed_outcome(assumptions, e, n, warnings, started_at, start);
    }

    let ratios = calculate_ratios(&income_statement, &balance_sheet, &debt_schedule, &timeline);
    let valuation = calculate_valuation(
        &income_statement,
        &cash_flow,
        &assumptions.valuation,
        &mut warnings,
    );

    let results = ScenarioResults {
        timeline,
        revenue,
        operating_expenses,
        depreciation: depreciation_schedule,
        capital_expenditure,
        debt: debt_schedule,
        income_statement,
        cash_flow,
        balance_sheet,
        ratios,
        valuation,
    };

    RunOutcome {
        report: RunReport {
            scenario_name: assumptions.scenario_name.clone(),
            status: RunStatus::Success,
            periods_calculated: n,
            started_at,
            completed_at: Utc::now(),
            duration_us: start.elapsed().as_micros() as u64,
            warnings,
            error_message: None,
            error_detail: None,
        },
        results: Some(results),
    }
}

fn failed_outcome(
    assumptions: &ScenarioAssumptions,
    error: FinModelError,
    periods_calculated: usize,
    warnings: Vec<String>,
    started_at: DateTime<Utc>,
    start: Instant,
) -> RunOutcome {
    RunOutcome {
        report: RunReport {
            scenario_name: assumptions.scenario_name.clone(),
            status: RunStatus::Failed,
            periods_calculated,
            started_at,
            completed_at: Utc::now(),
            duration_us: start.elapsed().as_micros() as u64,
            warnings,
            error_message: Some(error.to_string()),
            error_detail: Some(format!("{error:?}")),
        },
        results: None,
    }
}

impl ScenarioResults {
    /// Flatten the run into the replacement record set for the persistence
    /// collaborator. The set is complete: the caller deletes any prior
    /// records for the scenario and writes these in one step.
    pub fn to_records(&self) -> Vec<SeriesRecord> {
        let t = &self.timeline;
        let mut records = Vec::new();

        let income_items = [
            ("Total Revenue", &self.income_statement.total_revenue),
            (
                "Total Operating Expenses",
                &self.income_statement.total_operating_expenses,
            ),
            ("EBITDA", &self.income_statement.ebitda),
            ("Depreciation", &self.income_statement.depreciation),
            ("EBIT", &self.income_statement.ebit),
            ("Interest Expense", &self.income_statement.interest_expense),
            ("EBT", &self.income_statement.ebt),
            ("Tax Expense", &self.income_statement.tax_expense),
            ("Net Income", &self.income_statement.net_income),
        ];
        for (label, series) in income_items {
            records.push(SeriesRecord::from_series(
                StatementCategory::IncomeStatement,
                label,
                t,
                series,
            ));
        }

        let cash_flow_items = [
            ("Net Income", &self.cash_flow.net_income),
            ("Depreciation", &self.cash_flow.depreciation),
            ("Interest Expense", &self.cash_flow.interest_addback),
            (
                "Changes in Working Capital",
                &self.cash_flow.changes_in_working_capital,
            ),
            (
                "Cash Flow from Operations",
                &self.cash_flow.cash_from_operations,
            ),
            ("Capital Expenditure", &self.cash_flow.capital_expenditure),
            (
                "Cash Flow from Investing",
                &self.cash_flow.cash_from_investing,
            ),
            ("Debt Drawdowns", &self.cash_flow.debt_drawdowns),
            ("Debt Repayment", &self.cash_flow.debt_repayment),
            ("Interest Paid", &self.cash_flow.interest_paid),
            (
                "Cash Flow from Financing",
                &self.cash_flow.cash_from_financing,
            ),
            ("Net Cash Flow", &self.cash_flow.net_cash_flow),
            ("Cash Balance (End)", &self.cash_flow.cash_balance_end),
        ];
        for (label, series) in cash_flow_items {
            records.push(SeriesRecord::from_series(StatementCategory::CashFlow, label, t, series));
        }

        let balance_items = [
            ("Cash", &self.balance_sheet.cash),
            ("Net Fixed Assets", &self.balance_sheet.net_fixed_assets),
            ("Total Assets", &self.balance_sheet.total_assets),
            ("Debt", &self.balance_sheet.debt),
            ("Total Liabilities", &self.balance_sheet.total_liabilities),
            ("Retained Earnings", &self.balance_sheet.retained_earnings),
            ("Total Equity", &self.balance_sheet.total_equity),
            ("Balance Check (should be 0)", &self.balance_sheet.balance_check),
        ];
        for (label, series) in balance_items {
            records.push(SeriesRecord::from_series(
                StatementCategory::BalanceSheet,
                label,
                t,
                series,
            ));
        }

        let ratio_items = [
            ("EBITDA Margin (%)", &self.ratios.ebitda_margin_pct),
            ("Net Margin (%)", &self.ratios.net_margin_pct),
            ("ROE (%)", &self.ratios.roe_pct),
            ("ROA (%)", &self.ratios.roa_pct),
            ("DSCR", &self.ratios.dscr),
            ("Debt-to-Equity", &self.ratios.debt_to_equity),
        ];
        for (label, series) in ratio_items {
            records.push(SeriesRecord::from_series(StatementCategory::Ratio, label, t, series));
        }

        let debt_items = [
            ("Opening Balance", &self.debt.opening_balance),
            ("Drawdowns", &self.debt.drawdowns),
            ("Principal Repayment", &self.debt.principal_repayment),
            ("Interest Expense", &self.debt.interest_expense),
            ("Closing Balance", &self.debt.closing_balance),
        ];
        for (label, series) in debt_items {
            records.push(SeriesRecord::from_series(
                StatementCategory::DebtSchedule,
                label,
                t,
                series,
            ));
        }

        records.push(SeriesRecord {
            category: StatementCategory::Valuation,
            line_item: "Valuation Metrics".into(),
            values: vec![
                ("NPV".into(), self.valuation.npv),
                ("IRR (%)".into(), self.valuation.irr_pct),
                ("Terminal Value".into(), self.valuation.terminal_value),
            ],
        });

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{
        CapitalExpenditure, DebtFinancing, MacroAssumptions, OperatingExpenses, RepaymentType,
        RevenueProduct, TaxAssumptions, TimelineAssumptions, ValuationAssumptions,
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn bare_scenario(years: u32) -> ScenarioAssumptions {
        ScenarioAssumptions {
            scenario_name: "Test".into(),
            timeline: TimelineAssumptions {
                base_year: 2025,
                number_of_years: years,
                construction_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                operations_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            },
            macro_assumptions: MacroAssumptions {
                local_inflation_rate: dec!(0),
                discount_rate_wacc: dec!(10),
            },
            revenue_products: vec![RevenueProduct {
                product_name: "Product".into(),
                year_1_sales_volume: dec!(1000),
                unit_price_year_1: dec!(100),
                volume_growth_rate: dec!(0),
                price_escalation_rate: dec!(0),
                revenue_rampup_months: None,
                seasonal_adjustment_factor: None,
            }],
            operating_expenses: OperatingExpenses {
                total_headcount: 0,
                average_annual_salary: dec!(0),
                salary_escalation_rate: dec!(0),
                benefits_payroll_tax_pct: dec!(0),
                power_electricity_cost_annual: dec!(0),
                water_gas_utilities_annual: dec!(0),
                utilities_escalation_rate: dec!(0),
                administrative_expenses_annual: dec!(0),
                rent_facilities_annual: dec!(0),
                technology_software_annual: dec!(0),
                professional_fees_annual: dec!(0),
                insurance_annual: dec!(0),
            },
            capital_expenditure: CapitalExpenditure {
                land_cost: dec!(0),
                construction_building_cost: dec!(0),
                equipment_machinery_cost: dec!(0),
                ffe_cost: dec!(0),
                carpark_cost: None,
                amenities_cost: None,
                contingency_pct: dec!(0),
                professional_fees_pct: dec!(0),
                permits_approvals_pct: dec!(0),
                vat_on_construction_pct: dec!(0),
                year_1_drawdown_pct: dec!(100),
                year_2_drawdown_pct: dec!(0),
                year_3_drawdown_pct: dec!(0),
                replacement_capex_pct_revenue: dec!(0),
            },
            debt_financing: DebtFinancing {
                equity_percentage: dec!(100),
                debt_percentage: dec!(0),
                base_rate_value: dec!(0),
                interest_margin_spread: dec!(0),
                loan_tenor_years: 5,
                grace_period_months: 0,
                repayment_type: RepaymentType::Amortizing,
            },
            tax: TaxAssumptions {
                corporate_income_tax_rate: dec!(0),
                tax_loss_carryforward_years: 5,
            },
            depreciation_schedules: vec![],
            valuation: ValuationAssumptions {
                discount_rate_npv_pct: dec!(10),
                exit_multiple_ev_ebitda: dec!(8),
            },
        }
    }

    #[test]
    fn test_successful_run() {
        let outcome = run_scenario(&bare_scenario(3));
        assert_eq!(outcome.report.status, RunStatus::Success);
        assert_eq!(outcome.report.periods_calculated, 3);
        assert!(outcome.report.error_message.is_none());
        assert!(outcome.results.is_some());
    }

    #[test]
    fn test_fallback_window_on_bad_timeline() {
        let mut scenario = bare_scenario(3);
        scenario.timeline.number_of_years = 0;
        let outcome = run_scenario(&scenario);

        assert_eq!(outcome.report.status, RunStatus::Success);
        assert_eq!(outcome.report.periods_calculated, crate::periods::FALLBACK_YEARS);
        assert!(
            outcome
                .report
                .warnings
                .iter()
                .any(|w| w.contains("fallback window")),
            "fallback substitution must be surfaced in the warnings"
        );
    }

    #[test]
    fn test_failed_scheduler_substitutes_zero_series() {
        let mut scenario = bare_scenario(3);
        scenario.revenue_products[0].year_1_sales_volume = dec!(-1);
        let outcome = run_scenario(&scenario);

        // The run still succeeds; revenue is zero and the cause is recorded
        assert_eq!(outcome.report.status, RunStatus::Success);
        assert!(outcome
            .report
            .warnings
            .iter()
            .any(|w| w.contains("Revenue schedule failed")));

        let results = outcome.results.unwrap();
        assert_eq!(results.revenue.total.total(), Decimal::ZERO);
    }

    #[test]
    fn test_empty_product_list_warns() {
        let mut scenario = bare_scenario(2);
        scenario.revenue_products.clear();
        let outcome = run_scenario(&scenario);
        assert!(outcome
            .report
            .warnings
            .iter()
            .any(|w| w.contains("No revenue products")));
    }

    #[test]
    fn test_record_set_covers_every_category() {
        let outcome = run_scenario(&bare_scenario(2));
        let records = outcome.results.unwrap().to_records();

        for category in [
            StatementCategory::IncomeStatement,
            StatementCategory::BalanceSheet,
            StatementCategory::CashFlow,
            StatementCategory::Ratio,
            StatementCategory::DebtSchedule,
            StatementCategory::Valuation,
        ] {
            assert!(
                records.iter().any(|r| r.category == category),
                "missing category {category:?}"
            );
        }
    }

    #[test]
    fn test_records_are_keyed_by_period_label() {
        let outcome = run_scenario(&bare_scenario(2));
        let records = outcome.results.unwrap().to_records();
        let revenue = records
            .iter()
            .find(|r| r.line_item == "Total Revenue")
            .unwrap();
        assert_eq!(revenue.values[0].0, "2025");
        assert_eq!(revenue.values[1].0, "2026");
    }

    #[test]
    fn test_run_reports_duration() {
        let outcome = run_scenario(&bare_scenario(2));
        // Sub-second for a 2-period model
        assert!(outcome.report.duration_us < 1_000_000);
    }
}
