pub mod assumptions;
pub mod engine;
pub mod error;
pub mod periods;
pub mod ratios;
pub mod schedule;
pub mod statements;
pub mod time_value;
pub mod types;
pub mod valuation;

pub use error::FinModelError;
pub use types::*;

/// Standard result type for all projection-engine operations
pub type FinModelResult<T> = Result<T, FinModelError>;
