use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assumptions::CapitalExpenditure;
use crate::error::FinModelError;
use crate::types::{round_money, Money, Series, Timeline};
use crate::FinModelResult;

/// Projected capital spend plus the cost build-up the debt sizing reuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapexSchedule {
    pub spend: Series,
    pub total_hard_costs: Money,
    pub total_capex: Money,
}

impl CapexSchedule {
    pub fn zeroed(len: usize) -> Self {
        CapexSchedule {
            spend: Series::zeros(len),
            total_hard_costs: Decimal::ZERO,
            total_capex: Decimal::ZERO,
        }
    }
}

/// Total hard costs across all configured components, including the
/// optional category-specific add-ons.
pub fn total_hard_costs(capex: &CapitalExpenditure) -> Money {
    let mut total = capex.land_cost
        + capex.construction_building_cost
        + capex.equipment_machinery_cost
        + capex.ffe_cost;
    if let Some(carpark) = capex.carpark_cost {
        total += carpark;
    }
    if let Some(amenities) = capex.amenities_cost {
        total += amenities;
    }
    total
}

/// Total CAPEX: hard costs plus the four soft-cost percentages of hard cost.
pub fn total_capex(capex: &CapitalExpenditure) -> Money {
    let hard = total_hard_costs(capex);
    let contingency = hard * capex.contingency_pct / dec!(100);
    let professional_fees = hard * capex.professional_fees_pct / dec!(100);
    let permits = hard * capex.permits_approvals_pct / dec!(100);
    let vat = hard * capex.vat_on_construction_pct / dec!(100);
    hard + contingency + professional_fees + permits + vat
}

/// Allocate total CAPEX across the three-year drawdown window after
/// construction start. The drawdown percentages need not sum to 100% and
/// are never renormalized; periods past the window spend zero (the
/// replacement-capex rule is carried in configuration but not engaged).
pub fn project_capex(
    capex: &CapitalExpenditure,
    timeline: &Timeline,
    construction_start_year: i32,
) -> FinModelResult<CapexSchedule> {
    validate_capex(capex)?;

    let hard = total_hard_costs(capex);
    let total = total_capex(capex);

    let n = timeline.len();
    let mut values = Vec::with_capacity(n);

    for i in 0..n {
        let offset = timeline.year_at(i) - construction_start_year;
        let drawdown_pct = match offset {
            0 => capex.year_1_drawdown_pct,
            1 => capex.year_2_drawdown_pct,
            2 => capex.year_3_drawdown_pct,
            _ => Decimal::ZERO,
        };
        values.push(round_money(total * drawdown_pct / dec!(100)));
    }

    Ok(CapexSchedule {
        spend: Series::from_values(values),
        total_hard_costs: hard,
        total_capex: total,
    })
}

fn validate_capex(capex: &CapitalExpenditure) -> FinModelResult<()> {
    let components = [
        ("land_cost", capex.land_cost),
        ("construction_building_cost", capex.construction_building_cost),
        ("equipment_machinery_cost", capex.equipment_machinery_cost),
        ("ffe_cost", capex.ffe_cost),
        ("carpark_cost", capex.carpark_cost.unwrap_or(Decimal::ZERO)),
        (
            "amenities_cost",
            capex.amenities_cost.unwrap_or(Decimal::ZERO),
        ),
    ];
    for (field, value) in components {
        if value < Decimal::ZERO {
            return Err(FinModelError::Configuration {
                field: field.into(),
                reason: format!("Cost component must be non-negative, got {value}"),
            });
        }
    }

    let percentages = [
        ("contingency_pct", capex.contingency_pct),
        ("professional_fees_pct", capex.professional_fees_pct),
        ("permits_approvals_pct", capex.permits_approvals_pct),
        ("vat_on_construction_pct", capex.vat_on_construction_pct),
        ("year_1_drawdown_pct", capex.year_1_drawdown_pct),
        ("year_2_drawdown_pct", capex.year_2_drawdown_pct),
        ("year_3_drawdown_pct", capex.year_3_drawdown_pct),
    ];
    for (field, value) in percentages {
        if value < Decimal::ZERO {
            return Err(FinModelError::Configuration {
                field: field.into(),
                reason: format!("Percentage must be non-negative, got {value}"),
            });
        }
    }

    Ok(())
}
