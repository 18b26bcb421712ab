use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::schedule::debt::DebtSchedule;
use crate::statements::{BalanceSheet, IncomeStatement};
use crate::types::{round_money, Money, Series, Timeline};

/// Per-period profitability, leverage, and coverage ratios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioSet {
    pub ebitda_margin_pct: Series,
    pub net_margin_pct: Series,
    pub roe_pct: Series,
    pub roa_pct: Series,
    pub dscr: Series,
    pub debt_to_equity: Series,
}

/// Derive the ratio set from the assembled statements. Every ratio guards
/// its denominator: a non-positive base reports 0 rather than dividing.
pub fn calculate_ratios(
    income: &IncomeStatement,
    balance_sheet: &BalanceSheet,
    debt: &DebtSchedule,
    timeline: &Timeline,
) -> RatioSet {
    let n = timeline.len();

    let mut ebitda_margin_pct = Vec::with_capacity(n);
    let mut net_margin_pct = Vec::with_capacity(n);
    let mut roe_pct = Vec::with_capacity(n);
    let mut roa_pct = Vec::with_capacity(n);
    let mut dscr = Vec::with_capacity(n);
    let mut debt_to_equity = Vec::with_capacity(n);

    for i in 0..n {
        let revenue = income.total_revenue.get(i);
        let equity = balance_sheet.total_equity.get(i);
        let assets = balance_sheet.total_assets.get(i);

        ebitda_margin_pct.push(pct_ratio(income.ebitda.get(i), revenue));
        net_margin_pct.push(pct_ratio(income.net_income.get(i), revenue));
        roe_pct.push(pct_ratio(income.net_income.get(i), equity));
        roa_pct.push(pct_ratio(income.net_income.get(i), assets));

        let debt_service = debt.principal_repayment.get(i) + debt.interest_expense.get(i);
        dscr.push(guarded_ratio(income.ebitda.get(i), debt_service));
        debt_to_equity.push(guarded_ratio(debt.closing_balance.get(i), equity));
    }

    RatioSet {
        ebitda_margin_pct: Series::from_values(ebitda_margin_pct),
        net_margin_pct: Series::from_values(net_margin_pct),
        roe_pct: Series::from_values(roe_pct),
        roa_pct: Series::from_values(roa_pct),
        dscr: Series::from_values(dscr),
        debt_to_equity: Series::from_values(debt_to_equity),
    }
}

fn pct_ratio(numerator: Money, denominator: Money) -> Decimal {
    if denominator <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        round_money(numerator / denominator * dec!(100))
    }
}

fn guarded_ratio(numerator: Money, denominator: Money) -> Decimal {
    if denominator <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        round_money(numerator / denominator)
    }
}
