//! The five leaf schedulers. Each is a pure function over the assumption
//! subset it needs; none depends on another scheduler's output, so the
//! orchestrator is free to run them in any order.

pub mod capex;
pub mod debt;
pub mod depreciation;
pub mod opex;
pub mod revenue;
