use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assumptions::ValuationAssumptions;
use crate::statements::{CashFlowStatement, IncomeStatement};
use crate::time_value;
use crate::types::{round_money, Money, Rate};

const IRR_INITIAL_GUESS: Decimal = dec!(0.10);

/// Discounted-cash-flow valuation figures for a completed projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Valuation {
    pub npv: Money,
    /// 0 when the root-finder fails to converge (recorded as a warning)
    pub irr_pct: Rate,
    /// Final-period EBITDA times the configured exit multiple
    pub terminal_value: Money,
}

/// NPV, IRR, and terminal value over the operating cash flow series.
///
/// IRR non-convergence is a degraded result, not a failure: the metric
/// reports 0 and the cause lands in the warnings.
pub fn calculate_valuation(
    income: &IncomeStatement,
    cash_flow: &CashFlowStatement,
    assumptions: &ValuationAssumptions,
    warnings: &mut Vec<String>,
) -> Valuation {
    let flows = cash_flow.cash_from_operations.values();
    let discount_rate = assumptions.discount_rate_npv_pct / dec!(100);

    let npv = match time_value::npv(discount_rate, flows) {
        Ok(value) => round_money(value),
        Err(e) => {
            warnings.push(format!("NPV calculation degraded to 0: {e}"));
            Decimal::ZERO
        }
    };

    let irr_pct = match time_value::irr(flows, IRR_INITIAL_GUESS) {
        Ok(rate) => round_money(rate * dec!(100)),
        Err(e) => {
            warnings.push(format!("IRR did not converge, reporting 0: {e}"));
            Decimal::ZERO
        }
    };

    let terminal_value = round_money(income.ebitda.last() * assumptions.exit_multiple_ev_ebitda);

    Valuation {
        npv,
        irr_pct,
        terminal_value,
    }
}
