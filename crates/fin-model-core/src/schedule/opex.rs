use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assumptions::{MacroAssumptions, OperatingExpenses};
use crate::error::FinModelError;
use crate::types::{round_money, Money, Pct, Series, Timeline};
use crate::FinModelResult;

/// Projected operating expenses by category plus the summed total.
///
/// Staff and utilities escalate at their own configured rates; the "other"
/// and insurance categories escalate at general inflation. That asymmetry is
/// deliberate and must be preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpexSchedule {
    pub staff_costs: Series,
    pub utilities: Series,
    pub other_operating: Series,
    pub insurance: Series,
    pub total: Series,
}

impl OpexSchedule {
    pub fn zeroed(len: usize) -> Self {
        OpexSchedule {
            staff_costs: Series::zeros(len),
            utilities: Series::zeros(len),
            other_operating: Series::zeros(len),
            insurance: Series::zeros(len),
            total: Series::zeros(len),
        }
    }
}

pub fn project_opex(
    opex: &OperatingExpenses,
    macro_assumptions: &MacroAssumptions,
    timeline: &Timeline,
) -> FinModelResult<OpexSchedule> {
    validate_opex(opex)?;

    let n = timeline.len();

    // Fully-loaded staff base: headcount * salary * (1 + benefits loading)
    let base_staff = Decimal::from(opex.total_headcount)
        * opex.average_annual_salary
        * (Decimal::ONE + opex.benefits_payroll_tax_pct / dec!(100));
    let staff_costs = escalate(base_staff, opex.salary_escalation_rate, n)?;

    let base_utilities = opex.power_electricity_cost_annual + opex.water_gas_utilities_annual;
    let utilities = escalate(base_utilities, opex.utilities_escalation_rate, n)?;

    let base_other = opex.administrative_expenses_annual
        + opex.rent_facilities_annual
        + opex.technology_software_annual
        + opex.professional_fees_annual;
    let other_operating = escalate(base_other, macro_assumptions.local_inflation_rate, n)?;

    let insurance = escalate(
        opex.insurance_annual,
        macro_assumptions.local_inflation_rate,
        n,
    )?;

    let total = staff_costs
        .add(&utilities)
        .add(&other_operating)
        .add(&insurance);

    Ok(OpexSchedule {
        staff_costs,
        utilities,
        other_operating,
        insurance,
        total,
    })
}

/// Compound `base` at `rate_pct` percent per period, finalizing each value.
fn escalate(base: Money, rate_pct: Pct, n: usize) -> FinModelResult<Series> {
    if rate_pct <= dec!(-100) {
        return Err(FinModelError::Configuration {
            field: "escalation_rate".into(),
            reason: "Escalation rate must exceed -100%".into(),
        });
    }

    let step = Decimal::ONE + rate_pct / dec!(100);
    let mut factor = Decimal::ONE;
    let mut values = Vec::with_capacity(n);

    for i in 0..n {
        if i > 0 {
            factor *= step;
        }
        values.push(round_money(base * factor));
    }

    Ok(Series::from_values(values))
}

fn validate_opex(opex: &OperatingExpenses) -> FinModelResult<()> {
    let fields = [
        ("average_annual_salary", opex.average_annual_salary),
        (
            "power_electricity_cost_annual",
            opex.power_electricity_cost_annual,
        ),
        ("water_gas_utilities_annual", opex.water_gas_utilities_annual),
        (
            "administrative_expenses_annual",
            opex.administrative_expenses_annual,
        ),
        ("rent_facilities_annual", opex.rent_facilities_annual),
        ("technology_software_annual", opex.technology_software_annual),
        ("professional_fees_annual", opex.professional_fees_annual),
        ("insurance_annual", opex.insurance_annual),
    ];

    for (field, value) in fields {
        if value < Decimal::ZERO {
            return Err(FinModelError::Configuration {
                field: field.into(),
                reason: format!("Value must be non-negative, got {value}"),
            });
        }
    }

    Ok(())
}
