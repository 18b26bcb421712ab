use crate::assumptions::TimelineAssumptions;
use crate::error::FinModelError;
use crate::types::Timeline;
use crate::FinModelResult;

/// Fallback window used by the orchestrator when period derivation fails.
/// The substitution is recorded as a run warning, never applied silently.
pub const FALLBACK_BASE_YEAR: i32 = 2025;
pub const FALLBACK_YEARS: usize = 10;

/// Derive the ordered reporting periods for a scenario: one annual period
/// per year, `number_of_years` long, starting at `base_year`.
pub fn generate_periods(timeline: &TimelineAssumptions) -> FinModelResult<Timeline> {
    if timeline.number_of_years == 0 {
        return Err(FinModelError::Configuration {
            field: "number_of_years".into(),
            reason: "Period count must be positive".into(),
        });
    }

    Ok(Timeline::from_base_year(
        timeline.base_year,
        timeline.number_of_years as usize,
    ))
}

pub fn fallback_timeline() -> Timeline {
    Timeline::from_base_year(FALLBACK_BASE_YEAR, FALLBACK_YEARS)
}
