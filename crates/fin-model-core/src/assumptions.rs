use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Multiple, Pct};

/// Immutable input bundle for one calculation run. Read-only for the
/// duration of the run; the engine holds no live storage handles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioAssumptions {
    pub scenario_name: String,
    pub timeline: TimelineAssumptions,
    pub macro_assumptions: MacroAssumptions,
    pub revenue_products: Vec<RevenueProduct>,
    pub operating_expenses: OperatingExpenses,
    pub capital_expenditure: CapitalExpenditure,
    pub debt_financing: DebtFinancing,
    pub tax: TaxAssumptions,
    pub depreciation_schedules: Vec<DepreciationEntry>,
    pub valuation: ValuationAssumptions,
}

/// Model timeline: reporting window plus the project milestones that gate
/// the CAPEX, depreciation, and debt schedules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineAssumptions {
    pub base_year: i32,
    pub number_of_years: u32,
    pub construction_start: NaiveDate,
    pub operations_start: NaiveDate,
}

impl TimelineAssumptions {
    /// Calendar year CAPEX drawdowns begin
    pub fn construction_start_year(&self) -> i32 {
        self.construction_start.year()
    }

    /// Calendar year depreciation and the debt repayment clock begin
    pub fn operations_start_year(&self) -> i32 {
        self.operations_start.year()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroAssumptions {
    /// General inflation, used to escalate uncategorized operating costs
    pub local_inflation_rate: Pct,
    pub discount_rate_wacc: Pct,
}

/// One revenue product line. A scenario carries 1..N of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueProduct {
    pub product_name: String,
    pub year_1_sales_volume: Money,
    pub unit_price_year_1: Money,
    pub volume_growth_rate: Pct,
    pub price_escalation_rate: Pct,
    /// First-period revenue is scaled by min(1, months/12) when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_rampup_months: Option<u32>,
    /// Multiplies every period when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasonal_adjustment_factor: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingExpenses {
    pub total_headcount: u32,
    pub average_annual_salary: Money,
    pub salary_escalation_rate: Pct,
    /// Benefits and payroll taxes as a percentage of salary
    pub benefits_payroll_tax_pct: Pct,
    pub power_electricity_cost_annual: Money,
    pub water_gas_utilities_annual: Money,
    pub utilities_escalation_rate: Pct,
    pub administrative_expenses_annual: Money,
    pub rent_facilities_annual: Money,
    pub technology_software_annual: Money,
    pub professional_fees_annual: Money,
    pub insurance_annual: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalExpenditure {
    pub land_cost: Money,
    pub construction_building_cost: Money,
    pub equipment_machinery_cost: Money,
    /// Furniture, fixtures, and equipment
    pub ffe_cost: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carpark_cost: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities_cost: Option<Money>,
    pub contingency_pct: Pct,
    pub professional_fees_pct: Pct,
    pub permits_approvals_pct: Pct,
    pub vat_on_construction_pct: Pct,
    /// Spend allocation over the first three construction years. The three
    /// percentages need not sum to 100; no renormalization is performed.
    pub year_1_drawdown_pct: Pct,
    pub year_2_drawdown_pct: Pct,
    pub year_3_drawdown_pct: Pct,
    /// Carried in configuration; periods past the drawdown window spend zero
    pub replacement_capex_pct_revenue: Pct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaymentType {
    Amortizing,
    /// No principal until maturity; repays in full in the final tenor year
    Bullet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtFinancing {
    pub equity_percentage: Pct,
    /// Debt principal is sized as this percentage of total CAPEX
    pub debt_percentage: Pct,
    pub base_rate_value: Pct,
    pub interest_margin_spread: Pct,
    pub loan_tenor_years: u32,
    pub grace_period_months: u32,
    pub repayment_type: RepaymentType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxAssumptions {
    pub corporate_income_tax_rate: Pct,
    /// Captured for completeness; no carryforward is applied when computing
    /// tax expense, so negative EBT earns no benefit
    pub tax_loss_carryforward_years: u32,
}

/// One asset category in the depreciation schedule. A useful life of zero
/// marks a non-depreciating category such as land.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepreciationEntry {
    pub asset_category: String,
    pub asset_value: Money,
    pub useful_life_years: u32,
    pub residual_value_pct: Pct,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationAssumptions {
    pub discount_rate_npv_pct: Pct,
    pub exit_multiple_ev_ebitda: Multiple,
}
