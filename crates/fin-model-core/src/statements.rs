use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assumptions::TaxAssumptions;
use crate::error::FinModelError;
use crate::schedule::capex::CapexSchedule;
use crate::schedule::debt::DebtSchedule;
use crate::schedule::depreciation::DepreciationSchedule;
use crate::schedule::opex::OpexSchedule;
use crate::schedule::revenue::RevenueSchedule;
use crate::types::{round_money, Series, Timeline};
use crate::FinModelResult;

/// Maximum tolerated deviation, per period, between total assets and total
/// liabilities plus equity. Breaching it fails the run.
pub const BALANCE_TOLERANCE: Decimal = dec!(0.01);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub total_revenue: Series,
    pub total_operating_expenses: Series,
    pub ebitda: Series,
    pub depreciation: Series,
    pub ebit: Series,
    pub interest_expense: Series,
    pub ebt: Series,
    pub tax_expense: Series,
    pub net_income: Series,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub net_income: Series,
    pub depreciation: Series,
    /// Interest expense added back to operations; the cash cost sits in the
    /// financing section as `interest_paid`
    pub interest_addback: Series,
    pub changes_in_working_capital: Series,
    pub cash_from_operations: Series,
    /// Negative: cash out the door
    pub capital_expenditure: Series,
    pub cash_from_investing: Series,
    pub debt_drawdowns: Series,
    /// Negative
    pub debt_repayment: Series,
    /// Negative
    pub interest_paid: Series,
    pub cash_from_financing: Series,
    pub net_cash_flow: Series,
    pub cash_balance_end: Series,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub cash: Series,
    pub net_fixed_assets: Series,
    pub total_assets: Series,
    pub debt: Series,
    pub total_liabilities: Series,
    pub retained_earnings: Series,
    pub total_equity: Series,
    pub balance_check: Series,
}

/// Income statement: revenue down to net income. Tax applies only to
/// positive EBT; no loss carryforward at this layer.
pub fn build_income_statement(
    revenue: &RevenueSchedule,
    opex: &OpexSchedule,
    depreciation: &DepreciationSchedule,
    debt: &DebtSchedule,
    tax: &TaxAssumptions,
    timeline: &Timeline,
) -> IncomeStatement {
    let total_revenue = revenue.total.clone();
    let total_operating_expenses = opex.total.clone();
    let ebitda = total_revenue.sub(&total_operating_expenses);
    let total_depreciation = depreciation.total.clone();
    let ebit = ebitda.sub(&total_depreciation);
    let interest_expense = debt.interest_expense.clone();
    let ebt = ebit.sub(&interest_expense);

    let tax_rate = tax.corporate_income_tax_rate / dec!(100);
    let tax_values = (0..timeline.len())
        .map(|i| {
            let period_ebt = ebt.get(i);
            if period_ebt > Decimal::ZERO {
                round_money(period_ebt * tax_rate)
            } else {
                Decimal::ZERO
            }
        })
        .collect();
    let tax_expense = Series::from_values(tax_values);
    let net_income = ebt.sub(&tax_expense);

    IncomeStatement {
        total_revenue,
        total_operating_expenses,
        ebitda,
        depreciation: total_depreciation,
        ebit,
        interest_expense,
        ebt,
        tax_expense,
        net_income,
    }
}

/// Cash flow statement. Working-capital movement is held at zero (line
/// retained for presentation). Interest is added back to operations and
/// carried as a financing outflow, so the two sections net to the true cash
/// movement and the balance sheet ties.
pub fn build_cash_flow_statement(
    income: &IncomeStatement,
    capex: &CapexSchedule,
    debt: &DebtSchedule,
    timeline: &Timeline,
) -> CashFlowStatement {
    let n = timeline.len();

    let net_income = income.net_income.clone();
    let depreciation = income.depreciation.clone();
    let interest_addback = income.interest_expense.clone();
    let changes_in_working_capital = Series::zeros(n);

    let cash_from_operations = net_income
        .add(&depreciation)
        .add(&interest_addback)
        .sub(&changes_in_working_capital);

    let capital_expenditure =
        Series::from_values(capex.spend.iter().map(|v| -*v).collect());
    let cash_from_investing = capital_expenditure.clone();

    let debt_drawdowns = debt.drawdowns.clone();
    let debt_repayment =
        Series::from_values(debt.principal_repayment.iter().map(|v| -*v).collect());
    let interest_paid =
        Series::from_values(debt.interest_expense.iter().map(|v| -*v).collect());
    let cash_from_financing = debt_drawdowns.add(&debt_repayment).add(&interest_paid);

    let net_cash_flow = cash_from_operations
        .add(&cash_from_investing)
        .add(&cash_from_financing);
    let cash_balance_end = net_cash_flow.cumulative();

    CashFlowStatement {
        net_income,
        depreciation,
        interest_addback,
        changes_in_working_capital,
        cash_from_operations,
        capital_expenditure,
        cash_from_investing,
        debt_drawdowns,
        debt_repayment,
        interest_paid,
        cash_from_financing,
        net_cash_flow,
        cash_balance_end,
    }
}

/// Balance sheet, derived entirely from the other two statements and the
/// schedules: cash from the cash flow statement, net fixed assets from
/// cumulative CAPEX less cumulative depreciation, liabilities from the debt
/// closing balance, equity as retained earnings.
pub fn build_balance_sheet(
    income: &IncomeStatement,
    cash_flow: &CashFlowStatement,
    capex: &CapexSchedule,
    debt: &DebtSchedule,
) -> BalanceSheet {
    let cash = cash_flow.cash_balance_end.clone();
    let net_fixed_assets = capex
        .spend
        .cumulative()
        .sub(&income.depreciation.cumulative());
    let total_assets = cash.add(&net_fixed_assets);

    let debt_balance = debt.closing_balance.clone();
    let total_liabilities = debt_balance.clone();

    let retained_earnings = income.net_income.cumulative();
    let total_equity = retained_earnings.clone();

    let balance_check = total_assets.sub(&total_liabilities.add(&total_equity));

    BalanceSheet {
        cash,
        net_fixed_assets,
        total_assets,
        debt: debt_balance,
        total_liabilities,
        retained_earnings,
        total_equity,
        balance_check,
    }
}

/// The fundamental accounting identity, checked per period. A breach is
/// fatal to the run: the caller must discard every computed series.
pub fn verify_balance(balance_sheet: &BalanceSheet, timeline: &Timeline) -> FinModelResult<()> {
    for i in 0..timeline.len() {
        let difference = balance_sheet.balance_check.get(i);
        if difference.abs() > BALANCE_TOLERANCE {
            return Err(FinModelError::InvariantViolation {
                period: timeline.label_at(i).to_string(),
                difference,
            });
        }
    }
    Ok(())
}
