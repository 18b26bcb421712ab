use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::FinModelError;
use crate::types::{Money, Rate};
use crate::FinModelResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;

/// Net Present Value of a series of cash flows, discounted from period 0.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> FinModelResult<Money> {
    if rate <= dec!(-1) {
        return Err(FinModelError::Configuration {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount.is_zero() {
            return Err(FinModelError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}

/// Internal Rate of Return using Newton-Raphson
pub fn irr(cash_flows: &[Money], guess: Rate) -> FinModelResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(FinModelError::Calculation {
            stage: "IRR".into(),
            reason: "At least 2 cash flows required".into(),
        });
    }

    let mut rate = guess;

    for i in 0..MAX_IRR_ITERATIONS {
        let mut npv_val = Decimal::ZERO;
        let mut dnpv = Decimal::ZERO;
        let one_plus_r = Decimal::ONE + rate;

        for (t, cf) in cash_flows.iter().enumerate() {
            let t_dec = Decimal::from(t as i64);
            let discount = one_plus_r.powd(t_dec);
            if discount.is_zero() {
                continue;
            }
            npv_val += cf / discount;
            if t > 0 {
                dnpv -= t_dec * cf / (one_plus_r.powd(t_dec + Decimal::ONE));
            }
        }

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            return Err(FinModelError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        rate -= npv_val / dnpv;

        // Guard against divergence
        if rate < dec!(-0.99) {
            rate = dec!(-0.99);
        } else if rate > dec!(100.0) {
            rate = dec!(100.0);
        }
    }

    Err(FinModelError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: npv(rate, cash_flows).unwrap_or(Decimal::MAX),
    })
}

/// Fixed periodic payment that fully amortizes `pv` over `nper` periods:
/// PMT = PV * (r * (1+r)^n) / ((1+r)^n - 1), or PV / n when the rate is zero.
pub fn pmt(pv: Money, rate: Rate, nper: u32) -> FinModelResult<Money> {
    if nper == 0 {
        return Err(FinModelError::Configuration {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(pv / Decimal::from(nper));
    }

    // Running product keeps integer powers exact
    let one_plus_r = Decimal::ONE + rate;
    let mut factor = Decimal::ONE;
    for _ in 0..nper {
        factor *= one_plus_r;
    }

    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(FinModelError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    Ok(pv * (rate * factor) / denominator)
}
