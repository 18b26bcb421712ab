use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assumptions::DepreciationEntry;
use crate::error::FinModelError;
use crate::types::{round_money, Series, Timeline};
use crate::FinModelResult;

/// Projected depreciation: one series per asset category plus the total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepreciationSchedule {
    pub categories: Vec<(String, Series)>,
    pub total: Series,
}

impl DepreciationSchedule {
    pub fn zeroed(len: usize) -> Self {
        DepreciationSchedule {
            categories: Vec::new(),
            total: Series::zeros(len),
        }
    }
}

/// Straight-line depreciation per asset category, gated by the operations
/// start year and stopped once the useful life is exhausted. A zero useful
/// life marks a non-depreciating category (land) that contributes zero in
/// every period.
pub fn project_depreciation(
    entries: &[DepreciationEntry],
    timeline: &Timeline,
    operations_start_year: i32,
) -> FinModelResult<DepreciationSchedule> {
    let n = timeline.len();
    let mut categories = Vec::with_capacity(entries.len());
    let mut total = Series::zeros(n);

    for entry in entries {
        validate_entry(entry)?;

        if entry.useful_life_years == 0 {
            categories.push((entry.asset_category.clone(), Series::zeros(n)));
            continue;
        }

        let depreciable_base =
            entry.asset_value * (Decimal::ONE - entry.residual_value_pct / dec!(100));
        let annual = depreciable_base / Decimal::from(entry.useful_life_years);

        let mut values = Vec::with_capacity(n);
        for i in 0..n {
            let year = timeline.year_at(i);
            let depreciating = year >= operations_start_year
                && (year - operations_start_year) < entry.useful_life_years as i32;
            values.push(if depreciating {
                round_money(annual)
            } else {
                Decimal::ZERO
            });
        }

        let series = Series::from_values(values);
        total = total.add(&series);
        categories.push((entry.asset_category.clone(), series));
    }

    Ok(DepreciationSchedule { categories, total })
}

fn validate_entry(entry: &DepreciationEntry) -> FinModelResult<()> {
    if entry.asset_value < Decimal::ZERO {
        return Err(FinModelError::Configuration {
            field: format!("{}.asset_value", entry.asset_category),
            reason: "Asset value must be non-negative".into(),
        });
    }
    if entry.residual_value_pct < Decimal::ZERO || entry.residual_value_pct > dec!(100) {
        return Err(FinModelError::Configuration {
            field: format!("{}.residual_value_pct", entry.asset_category),
            reason: format!(
                "Residual value must be between 0 and 100, got {}",
                entry.residual_value_pct
            ),
        });
    }
    Ok(())
}
