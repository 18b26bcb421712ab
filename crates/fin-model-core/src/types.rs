use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Percentage values as captured from scenario input (5 = 5%).
/// Converted to fractions at the point of use.
pub type Pct = Decimal;

/// Multiples (e.g., 8.5x EV/EBITDA)
pub type Multiple = Decimal;

/// Decimal places at which a line item is finalized.
pub const MONEY_DP: u32 = 2;

/// Round-half-up to the line-item precision. Applied only when a value is
/// finalized into a series, never inside a formula.
pub fn round_money(value: Decimal) -> Money {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// A single reporting period in a projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub label: String,
}

impl Period {
    pub fn from_year(year: i32) -> Self {
        Period {
            year,
            label: year.to_string(),
        }
    }
}

/// Ordered, duplicate-free sequence of reporting periods. Every series in a
/// run is indexed against the same timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    periods: Vec<Period>,
}

impl Timeline {
    /// Annual timeline: `count` consecutive years starting at `base_year`.
    pub fn from_base_year(base_year: i32, count: usize) -> Self {
        let periods = (0..count)
            .map(|i| Period::from_year(base_year + i as i32))
            .collect();
        Timeline { periods }
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn year_at(&self, index: usize) -> i32 {
        self.periods[index].year
    }

    pub fn label_at(&self, index: usize) -> &str {
        &self.periods[index].label
    }

    pub fn iter(&self) -> impl Iterator<Item = &Period> {
        self.periods.iter()
    }
}

/// A period-indexed sequence of exact decimal values, one per timeline slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    values: Vec<Money>,
}

impl Series {
    pub fn zeros(len: usize) -> Self {
        Series {
            values: vec![Decimal::ZERO; len],
        }
    }

    pub fn from_values(values: Vec<Money>) -> Self {
        Series { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Money {
        self.values[index]
    }

    pub fn last(&self) -> Money {
        self.values.last().copied().unwrap_or(Decimal::ZERO)
    }

    pub fn values(&self) -> &[Money] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = &Money> {
        self.values.iter()
    }

    /// Element-wise sum of two series over the same timeline.
    pub fn add(&self, other: &Series) -> Series {
        let values = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a + b)
            .collect();
        Series { values }
    }

    /// Element-wise difference of two series over the same timeline.
    pub fn sub(&self, other: &Series) -> Series {
        let values = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a - b)
            .collect();
        Series { values }
    }

    /// Running sum across periods.
    pub fn cumulative(&self) -> Series {
        let mut running = Decimal::ZERO;
        let values = self
            .values
            .iter()
            .map(|v| {
                running += v;
                running
            })
            .collect();
        Series { values }
    }

    pub fn total(&self) -> Money {
        self.values.iter().sum()
    }
}

/// Statement category a persisted series belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementCategory {
    IncomeStatement,
    BalanceSheet,
    CashFlow,
    Ratio,
    DebtSchedule,
    Valuation,
}

/// One named, period-indexed series as handed to the persistence
/// collaborator. A run's record set fully replaces any prior set for the
/// same scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub category: StatementCategory,
    pub line_item: String,
    pub values: Vec<(String, Money)>,
}

impl SeriesRecord {
    pub fn from_series(
        category: StatementCategory,
        line_item: &str,
        timeline: &Timeline,
        series: &Series,
    ) -> Self {
        let values = timeline
            .iter()
            .zip(series.iter())
            .map(|(p, v)| (p.label.clone(), *v))
            .collect();
        SeriesRecord {
            category,
            line_item: line_item.to_string(),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(1.004)), dec!(1.00));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
    }

    #[test]
    fn test_timeline_from_base_year() {
        let t = Timeline::from_base_year(2025, 3);
        assert_eq!(t.len(), 3);
        assert_eq!(t.year_at(0), 2025);
        assert_eq!(t.label_at(2), "2027");
    }

    #[test]
    fn test_series_cumulative() {
        let s = Series::from_values(vec![dec!(10), dec!(20), dec!(30)]);
        let c = s.cumulative();
        assert_eq!(c.values(), &[dec!(10), dec!(30), dec!(60)]);
    }

    #[test]
    fn test_series_add_sub() {
        let a = Series::from_values(vec![dec!(5), dec!(5)]);
        let b = Series::from_values(vec![dec!(2), dec!(3)]);
        assert_eq!(a.add(&b).values(), &[dec!(7), dec!(8)]);
        assert_eq!(a.sub(&b).values(), &[dec!(3), dec!(2)]);
    }

    #[test]
    fn test_series_record_pairs_labels() {
        let t = Timeline::from_base_year(2025, 2);
        let s = Series::from_values(vec![dec!(1), dec!(2)]);
        let rec = SeriesRecord::from_series(StatementCategory::Ratio, "DSCR", &t, &s);
        assert_eq!(rec.values[0], ("2025".to_string(), dec!(1)));
        assert_eq!(rec.values[1], ("2026".to_string(), dec!(2)));
    }
}
