use chrono::NaiveDate;
use fin_model_core::assumptions::{
    CapitalExpenditure, DebtFinancing, DepreciationEntry, MacroAssumptions, OperatingExpenses,
    RepaymentType, RevenueProduct, ScenarioAssumptions, TaxAssumptions, TimelineAssumptions,
    ValuationAssumptions,
};
use fin_model_core::engine::{run_scenario, RunStatus};
use fin_model_core::statements::BALANCE_TOLERANCE;
use fin_model_core::types::StatementCategory;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn date(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
}

/// Single product, no costs, no financing: the simplest complete scenario.
fn unlevered_scenario(years: u32) -> ScenarioAssumptions {
    ScenarioAssumptions {
        scenario_name: "Unlevered".into(),
        timeline: TimelineAssumptions {
            base_year: 2025,
            number_of_years: years,
            construction_start: date(2025),
            operations_start: date(2025),
        },
        macro_assumptions: MacroAssumptions {
            local_inflation_rate: dec!(0),
            discount_rate_wacc: dec!(10),
        },
        revenue_products: vec![RevenueProduct {
            product_name: "Product A".into(),
            year_1_sales_volume: dec!(1000),
            unit_price_year_1: dec!(100),
            volume_growth_rate: dec!(0),
            price_escalation_rate: dec!(0),
            revenue_rampup_months: None,
            seasonal_adjustment_factor: None,
        }],
        operating_expenses: OperatingExpenses {
            total_headcount: 0,
            average_annual_salary: dec!(0),
            salary_escalation_rate: dec!(0),
            benefits_payroll_tax_pct: dec!(0),
            power_electricity_cost_annual: dec!(0),
            water_gas_utilities_annual: dec!(0),
            utilities_escalation_rate: dec!(0),
            administrative_expenses_annual: dec!(0),
            rent_facilities_annual: dec!(0),
            technology_software_annual: dec!(0),
            professional_fees_annual: dec!(0),
            insurance_annual: dec!(0),
        },
        capital_expenditure: CapitalExpenditure {
            land_cost: dec!(0),
            construction_building_cost: dec!(0),
            equipment_machinery_cost: dec!(0),
            ffe_cost: dec!(0),
            carpark_cost: None,
            amenities_cost: None,
            contingency_pct: dec!(0),
            professional_fees_pct: dec!(0),
            permits_approvals_pct: dec!(0),
            vat_on_construction_pct: dec!(0),
            year_1_drawdown_pct: dec!(100),
            year_2_drawdown_pct: dec!(0),
            year_3_drawdown_pct: dec!(0),
            replacement_capex_pct_revenue: dec!(0),
        },
        debt_financing: DebtFinancing {
            equity_percentage: dec!(100),
            debt_percentage: dec!(0),
            base_rate_value: dec!(0),
            interest_margin_spread: dec!(0),
            loan_tenor_years: 5,
            grace_period_months: 0,
            repayment_type: RepaymentType::Amortizing,
        },
        tax: TaxAssumptions {
            corporate_income_tax_rate: dec!(0),
            tax_loss_carryforward_years: 5,
        },
        depreciation_schedules: vec![],
        valuation: ValuationAssumptions {
            discount_rate_npv_pct: dec!(10),
            exit_multiple_ev_ebitda: dec!(8),
        },
    }
}

/// Debt-funded greenfield project: construction, depreciation, amortizing
/// loan, tax. Exercises every schedule at once.
fn leveraged_scenario() -> ScenarioAssumptions {
    let mut scenario = unlevered_scenario(10);
    scenario.scenario_name = "Leveraged".into();
    scenario.timeline.operations_start = date(2026);

    scenario.revenue_products = vec![
        RevenueProduct {
            product_name: "Product A".into(),
            year_1_sales_volume: dec!(50000),
            unit_price_year_1: dec!(120),
            volume_growth_rate: dec!(5),
            price_escalation_rate: dec!(2),
            revenue_rampup_months: Some(6),
            seasonal_adjustment_factor: None,
        },
        RevenueProduct {
            product_name: "Product B".into(),
            year_1_sales_volume: dec!(20000),
            unit_price_year_1: dec!(80),
            volume_growth_rate: dec!(3),
            price_escalation_rate: dec!(2),
            revenue_rampup_months: None,
            seasonal_adjustment_factor: Some(dec!(0.95)),
        },
    ];

    scenario.operating_expenses = OperatingExpenses {
        total_headcount: 25,
        average_annual_salary: dec!(40000),
        salary_escalation_rate: dec!(4),
        benefits_payroll_tax_pct: dec!(18),
        power_electricity_cost_annual: dec!(250000),
        water_gas_utilities_annual: dec!(80000),
        utilities_escalation_rate: dec!(3),
        administrative_expenses_annual: dec!(120000),
        rent_facilities_annual: dec!(0),
        technology_software_annual: dec!(60000),
        professional_fees_annual: dec!(40000),
        insurance_annual: dec!(90000),
    };
    scenario.macro_assumptions.local_inflation_rate = dec!(2.5);

    scenario.capital_expenditure = CapitalExpenditure {
        land_cost: dec!(1000000),
        construction_building_cost: dec!(6000000),
        equipment_machinery_cost: dec!(2000000),
        ffe_cost: dec!(500000),
        carpark_cost: Some(dec!(250000)),
        amenities_cost: None,
        contingency_pct: dec!(5),
        professional_fees_pct: dec!(3),
        permits_approvals_pct: dec!(1),
        vat_on_construction_pct: dec!(0),
        year_1_drawdown_pct: dec!(60),
        year_2_drawdown_pct: dec!(40),
        year_3_drawdown_pct: dec!(0),
        replacement_capex_pct_revenue: dec!(2),
    };

    scenario.debt_financing = DebtFinancing {
        equity_percentage: dec!(40),
        debt_percentage: dec!(60),
        base_rate_value: dec!(5),
        interest_margin_spread: dec!(3),
        loan_tenor_years: 7,
        grace_period_months: 12,
        repayment_type: RepaymentType::Amortizing,
    };

    scenario.tax.corporate_income_tax_rate = dec!(30);

    scenario.depreciation_schedules = vec![
        DepreciationEntry {
            asset_category: "Land".into(),
            asset_value: dec!(1000000),
            useful_life_years: 0,
            residual_value_pct: dec!(0),
        },
        DepreciationEntry {
            asset_category: "Buildings".into(),
            asset_value: dec!(6000000),
            useful_life_years: 25,
            residual_value_pct: dec!(10),
        },
        DepreciationEntry {
            asset_category: "Equipment".into(),
            asset_value: dec!(2000000),
            useful_life_years: 10,
            residual_value_pct: dec!(5),
        },
    ];

    scenario
}

// ===========================================================================
// End-to-end: known-answer scenario
// ===========================================================================

#[test]
fn test_single_product_flat_scenario_exact_series() {
    // volume 1000, price 100, no growth, no costs, no debt, no tax,
    // 3 periods: every statement line is known exactly.
    let outcome = run_scenario(&unlevered_scenario(3));
    assert_eq!(outcome.report.status, RunStatus::Success);
    let results = outcome.results.expect("successful run must carry results");

    let expected_revenue = [dec!(100000.00), dec!(100000.00), dec!(100000.00)];
    let expected_cash = [dec!(100000.00), dec!(200000.00), dec!(300000.00)];

    for i in 0..3 {
        assert_eq!(
            results.income_statement.total_revenue.get(i),
            expected_revenue[i]
        );
        assert_eq!(
            results.income_statement.net_income.get(i),
            expected_revenue[i]
        );
        assert_eq!(results.cash_flow.cash_balance_end.get(i), expected_cash[i]);
        assert_eq!(results.balance_sheet.balance_check.get(i), dec!(0));
    }
}

#[test]
fn test_flat_scenario_valuation() {
    let outcome = run_scenario(&unlevered_scenario(3));
    let results = outcome.results.unwrap();

    // NPV at 10%: 100,000 * (1 + 1/1.1 + 1/1.21) ≈ 273,553.72
    assert!((results.valuation.npv - dec!(273553.72)).abs() <= dec!(0.01));
    // Terminal value: 100,000 EBITDA * 8x
    assert_eq!(results.valuation.terminal_value, dec!(800000.00));
    // All-positive CFO series has no IRR root; degrades to 0 with a warning
    assert_eq!(results.valuation.irr_pct, dec!(0));
    assert!(outcome.report.warnings.iter().any(|w| w.contains("IRR")));
}

// ===========================================================================
// Balance invariant
// ===========================================================================

#[test]
fn test_balance_invariant_unlevered() {
    let outcome = run_scenario(&unlevered_scenario(10));
    let results = outcome.results.unwrap();
    for i in 0..10 {
        assert!(results.balance_sheet.balance_check.get(i).abs() <= BALANCE_TOLERANCE);
    }
}

#[test]
fn test_balance_invariant_leveraged() {
    let scenario = leveraged_scenario();
    let outcome = run_scenario(&scenario);
    assert_eq!(
        outcome.report.status,
        RunStatus::Success,
        "leveraged run failed: {:?}",
        outcome.report.error_message
    );
    let results = outcome.results.unwrap();

    for i in 0..results.timeline.len() {
        let diff = results.balance_sheet.balance_check.get(i);
        assert!(
            diff.abs() <= BALANCE_TOLERANCE,
            "period {}: balance check off by {diff}",
            results.timeline.label_at(i)
        );
    }
}

#[test]
fn test_balance_invariant_bullet_debt() {
    let mut scenario = leveraged_scenario();
    scenario.debt_financing.repayment_type = RepaymentType::Bullet;
    let outcome = run_scenario(&scenario);
    let results = outcome.results.unwrap();

    for i in 0..results.timeline.len() {
        assert!(results.balance_sheet.balance_check.get(i).abs() <= BALANCE_TOLERANCE);
    }
}

// ===========================================================================
// Cross-statement consistency
// ===========================================================================

#[test]
fn test_leveraged_statements_are_consistent() {
    let outcome = run_scenario(&leveraged_scenario());
    let results = outcome.results.unwrap();
    let n = results.timeline.len();

    for i in 0..n {
        // Net cash flow is the sum of the three sections
        let sections = results.cash_flow.cash_from_operations.get(i)
            + results.cash_flow.cash_from_investing.get(i)
            + results.cash_flow.cash_from_financing.get(i);
        assert_eq!(results.cash_flow.net_cash_flow.get(i), sections);

        // Tax is never negative and vanishes when EBT is non-positive
        let tax = results.income_statement.tax_expense.get(i);
        assert!(tax >= Decimal::ZERO);
        if results.income_statement.ebt.get(i) <= Decimal::ZERO {
            assert_eq!(tax, Decimal::ZERO);
        }

        // Debt schedule feeds the income statement verbatim
        assert_eq!(
            results.income_statement.interest_expense.get(i),
            results.debt.interest_expense.get(i)
        );
    }

    // Balance sheet cash is the cash flow statement's running balance
    assert_eq!(
        results.balance_sheet.cash.values(),
        results.cash_flow.cash_balance_end.values()
    );
}

#[test]
fn test_depreciation_bound_holds_end_to_end() {
    let scenario = leveraged_scenario();
    let outcome = run_scenario(&scenario);
    let results = outcome.results.unwrap();

    let depreciable_base: Decimal = scenario
        .depreciation_schedules
        .iter()
        .map(|e| e.asset_value * (Decimal::ONE - e.residual_value_pct / dec!(100)))
        .sum();

    let cumulative = results.income_statement.depreciation.cumulative();
    for v in cumulative.iter() {
        assert!(*v <= depreciable_base);
    }
}

#[test]
fn test_debt_closes_out_within_tenor() {
    let scenario = leveraged_scenario();
    let outcome = run_scenario(&scenario);
    let results = outcome.results.unwrap();
    let n = results.timeline.len();

    // Repayment starts 2027 (ops 2026 + 12 months grace), tenor 7: the
    // balance must be fully repaid by 2033, inside the 2025-2034 window,
    // and never go negative.
    for i in 0..n {
        assert!(results.debt.closing_balance.get(i) >= Decimal::ZERO);
    }
    assert_eq!(results.debt.closing_balance.get(n - 1), Decimal::ZERO);
}

// ===========================================================================
// Record set for the persistence boundary
// ===========================================================================

#[test]
fn test_record_set_is_complete_replacement() {
    let outcome = run_scenario(&leveraged_scenario());
    let results = outcome.results.unwrap();
    let records = results.to_records();

    let expected = [
        (StatementCategory::IncomeStatement, "EBITDA"),
        (StatementCategory::CashFlow, "Cash Balance (End)"),
        (StatementCategory::BalanceSheet, "Balance Check (should be 0)"),
        (StatementCategory::Ratio, "DSCR"),
        (StatementCategory::DebtSchedule, "Closing Balance"),
        (StatementCategory::Valuation, "Valuation Metrics"),
    ];
    for (category, line_item) in expected {
        assert!(
            records
                .iter()
                .any(|r| r.category == category && r.line_item == line_item),
            "missing {category:?} / {line_item}"
        );
    }

    // Every period-indexed record covers the whole timeline
    let n = results.timeline.len();
    for record in &records {
        if record.category != StatementCategory::Valuation {
            assert_eq!(record.values.len(), n, "{} is incomplete", record.line_item);
        }
    }
}

#[test]
fn test_rerun_supersedes_prior_results() {
    let mut scenario = leveraged_scenario();
    let first = run_scenario(&scenario);
    let first_records = first.results.unwrap().to_records();

    scenario.revenue_products[0].year_1_sales_volume = dec!(60000);
    let second = run_scenario(&scenario);
    let second_records = second.results.unwrap().to_records();

    // The replacement set has the same shape; only the values move
    assert_eq!(first_records.len(), second_records.len());
    let revenue_of = |records: &[fin_model_core::types::SeriesRecord]| {
        records
            .iter()
            .find(|r| {
                r.category == StatementCategory::IncomeStatement && r.line_item == "Total Revenue"
            })
            .unwrap()
            .values[0]
            .1
    };
    assert!(revenue_of(&second_records) > revenue_of(&first_records));
}

// ===========================================================================
// Degraded-path behavior
// ===========================================================================

#[test]
fn test_partial_configuration_degrades_not_fails() {
    let mut scenario = leveraged_scenario();
    scenario.operating_expenses.insurance_annual = dec!(-500);
    let outcome = run_scenario(&scenario);

    assert_eq!(outcome.report.status, RunStatus::Success);
    assert!(outcome
        .report
        .warnings
        .iter()
        .any(|w| w.contains("Operating expense schedule failed")));

    // The rest of the model is intact: revenue is still projected
    let results = outcome.results.unwrap();
    assert!(results.revenue.total.get(0) > Decimal::ZERO);
    assert_eq!(results.operating_expenses.total.total(), Decimal::ZERO);
}

#[test]
fn test_zero_growth_series_are_idempotent() {
    // With every growth and escalation rate at zero, post-ramp-up periods
    // repeat the first-period value exactly.
    let mut scenario = leveraged_scenario();
    for product in &mut scenario.revenue_products {
        product.volume_growth_rate = dec!(0);
        product.price_escalation_rate = dec!(0);
        product.revenue_rampup_months = None;
    }
    scenario.operating_expenses.salary_escalation_rate = dec!(0);
    scenario.operating_expenses.utilities_escalation_rate = dec!(0);
    scenario.macro_assumptions.local_inflation_rate = dec!(0);

    let outcome = run_scenario(&scenario);
    let results = outcome.results.unwrap();
    let n = results.timeline.len();

    for i in 1..n {
        assert_eq!(results.revenue.total.get(i), results.revenue.total.get(0));
        assert_eq!(
            results.operating_expenses.total.get(i),
            results.operating_expenses.total.get(0)
        );
    }
}
