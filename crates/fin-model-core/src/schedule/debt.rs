use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assumptions::{CapitalExpenditure, DebtFinancing, RepaymentType};
use crate::error::FinModelError;
use crate::schedule::capex;
use crate::time_value::pmt;
use crate::types::{round_money, Money, Rate, Series, Timeline};
use crate::FinModelResult;

const MONTHS_IN_YEAR: u32 = 12;

/// Year-by-year debt schedule. Every line item is finalized at 2 dp and the
/// running balance is built from the finalized values, so closing always
/// equals opening + drawdown - principal to the cent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtSchedule {
    pub opening_balance: Series,
    pub drawdowns: Series,
    pub interest_expense: Series,
    pub principal_repayment: Series,
    pub closing_balance: Series,
    /// Principal sized off total CAPEX and the funding mix
    pub total_debt: Money,
}

impl DebtSchedule {
    pub fn zeroed(len: usize) -> Self {
        DebtSchedule {
            opening_balance: Series::zeros(len),
            drawdowns: Series::zeros(len),
            interest_expense: Series::zeros(len),
            principal_repayment: Series::zeros(len),
            closing_balance: Series::zeros(len),
            total_debt: Decimal::ZERO,
        }
    }
}

/// Project the debt schedule across the timeline.
///
/// Total CAPEX is recomputed from the CAPEX assumptions rather than taken
/// from the CAPEX schedule, keeping the leaf schedulers free of data
/// dependencies on one another. Drawdowns follow the same three-year
/// phasing percentages as the capital spend. Interest is approximated on
/// the average balance, treating drawdowns as mid-period.
pub fn project_debt(
    debt: &DebtFinancing,
    capex_assumptions: &CapitalExpenditure,
    timeline: &Timeline,
    construction_start_year: i32,
    operations_start_year: i32,
) -> FinModelResult<DebtSchedule> {
    validate_debt(debt)?;

    let total_debt = capex::total_capex(capex_assumptions) * debt.debt_percentage / dec!(100);
    let all_in_rate: Rate = (debt.base_rate_value + debt.interest_margin_spread) / dec!(100);

    let grace_years = (debt.grace_period_months / MONTHS_IN_YEAR) as i32;
    let repayment_start_year = operations_start_year + grace_years;
    let tenor = debt.loan_tenor_years as i32;

    let n = timeline.len();
    let mut opening_balance = Vec::with_capacity(n);
    let mut drawdowns = Vec::with_capacity(n);
    let mut interest_expense = Vec::with_capacity(n);
    let mut principal_repayment = Vec::with_capacity(n);
    let mut closing_balance = Vec::with_capacity(n);

    let mut closing = Decimal::ZERO;

    for i in 0..n {
        let year = timeline.year_at(i);
        let opening = closing;

        let drawdown_pct = match year - construction_start_year {
            0 => capex_assumptions.year_1_drawdown_pct,
            1 => capex_assumptions.year_2_drawdown_pct,
            2 => capex_assumptions.year_3_drawdown_pct,
            _ => Decimal::ZERO,
        };
        let drawdown = round_money(total_debt * drawdown_pct / dec!(100));
        let outstanding = opening + drawdown;

        let interest = round_money((opening + drawdown / dec!(2)) * all_in_rate);

        let principal = if year < repayment_start_year || outstanding.is_zero() {
            Decimal::ZERO
        } else {
            let remaining = tenor - (year - repayment_start_year);
            scheduled_principal(debt.repayment_type, outstanding, all_in_rate, remaining, interest)?
        };
        let principal = round_money(principal);

        closing = outstanding - principal;

        opening_balance.push(opening);
        drawdowns.push(drawdown);
        interest_expense.push(interest);
        principal_repayment.push(principal);
        closing_balance.push(closing);
    }

    Ok(DebtSchedule {
        opening_balance: Series::from_values(opening_balance),
        drawdowns: Series::from_values(drawdowns),
        interest_expense: Series::from_values(interest_expense),
        principal_repayment: Series::from_values(principal_repayment),
        closing_balance: Series::from_values(closing_balance),
        total_debt,
    })
}

/// Principal due in a repayment-window year with `remaining` tenor years
/// left (including the current one).
///
/// Amortizing debt pays the PMT on the outstanding balance over the
/// remaining tenor, net of interest, floored at zero and capped at the
/// balance. Bullet debt pays nothing until the final tenor year, then the
/// full balance. Once the tenor is exhausted, whatever is left is closed
/// out in full.
fn scheduled_principal(
    repayment_type: RepaymentType,
    outstanding: Money,
    rate: Rate,
    remaining: i32,
    interest: Money,
) -> FinModelResult<Money> {
    if remaining <= 0 {
        return Ok(outstanding);
    }

    match repayment_type {
        RepaymentType::Amortizing => {
            let payment = pmt(outstanding, rate, remaining as u32)?;
            Ok((payment - interest).max(Decimal::ZERO).min(outstanding))
        }
        RepaymentType::Bullet => {
            if remaining == 1 {
                Ok(outstanding)
            } else {
                Ok(Decimal::ZERO)
            }
        }
    }
}

fn validate_debt(debt: &DebtFinancing) -> FinModelResult<()> {
    if debt.debt_percentage < Decimal::ZERO || debt.debt_percentage > dec!(100) {
        return Err(FinModelError::Configuration {
            field: "debt_percentage".into(),
            reason: format!(
                "Debt percentage must be between 0 and 100, got {}",
                debt.debt_percentage
            ),
        });
    }
    if debt.debt_percentage > Decimal::ZERO && debt.loan_tenor_years == 0 {
        return Err(FinModelError::Configuration {
            field: "loan_tenor_years".into(),
            reason: "Tenor must be at least 1 year for a leveraged scenario".into(),
        });
    }
    Ok(())
}
