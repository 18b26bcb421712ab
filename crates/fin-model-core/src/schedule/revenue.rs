use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assumptions::RevenueProduct;
use crate::error::FinModelError;
use crate::types::{round_money, Series, Timeline};
use crate::FinModelResult;

const MONTHS_IN_YEAR: Decimal = dec!(12);

/// Projected revenue: one series per product plus the summed total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSchedule {
    pub products: Vec<(String, Series)>,
    pub total: Series,
}

impl RevenueSchedule {
    pub fn zeroed(len: usize) -> Self {
        RevenueSchedule {
            products: Vec::new(),
            total: Series::zeros(len),
        }
    }
}

/// Project per-product revenue across the timeline.
///
/// For period index i: volume and price each compound from their year-1
/// value at their configured rate; revenue is the product, dampened by the
/// ramp-up factor in the first period and by the seasonal factor in every
/// period where configured.
pub fn project_revenue(
    products: &[RevenueProduct],
    timeline: &Timeline,
) -> FinModelResult<RevenueSchedule> {
    let n = timeline.len();
    let mut schedule_products = Vec::with_capacity(products.len());
    let mut total = Series::zeros(n);

    for product in products {
        validate_product(product)?;

        let volume_factor_step = Decimal::ONE + product.volume_growth_rate / dec!(100);
        let price_factor_step = Decimal::ONE + product.price_escalation_rate / dec!(100);

        let mut volume_factor = Decimal::ONE;
        let mut price_factor = Decimal::ONE;
        let mut values = Vec::with_capacity(n);

        for i in 0..n {
            if i > 0 {
                volume_factor *= volume_factor_step;
                price_factor *= price_factor_step;
            }

            let volume = product.year_1_sales_volume * volume_factor;
            let price = product.unit_price_year_1 * price_factor;
            let mut revenue = volume * price;

            if let Some(months) = product.revenue_rampup_months {
                if i == 0 {
                    let rampup = (Decimal::from(months) / MONTHS_IN_YEAR).min(Decimal::ONE);
                    revenue *= rampup;
                }
            }

            if let Some(factor) = product.seasonal_adjustment_factor {
                revenue *= factor;
            }

            values.push(round_money(revenue));
        }

        let series = Series::from_values(values);
        total = total.add(&series);
        schedule_products.push((product.product_name.clone(), series));
    }

    Ok(RevenueSchedule {
        products: schedule_products,
        total,
    })
}

fn validate_product(product: &RevenueProduct) -> FinModelResult<()> {
    if product.year_1_sales_volume < Decimal::ZERO {
        return Err(FinModelError::Configuration {
            field: format!("{}.year_1_sales_volume", product.product_name),
            reason: "Sales volume must be non-negative".into(),
        });
    }
    if product.unit_price_year_1 < Decimal::ZERO {
        return Err(FinModelError::Configuration {
            field: format!("{}.unit_price_year_1", product.product_name),
            reason: "Unit price must be non-negative".into(),
        });
    }
    if product.volume_growth_rate <= dec!(-100) || product.price_escalation_rate <= dec!(-100) {
        return Err(FinModelError::Configuration {
            field: format!("{}.growth_rates", product.product_name),
            reason: "Growth and escalation rates must exceed -100%".into(),
        });
    }
    Ok(())
}
