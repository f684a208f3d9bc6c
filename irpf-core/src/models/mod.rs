mod bracket;
mod computation;
mod period;
mod policy;

pub use bracket::{Bracket, BracketTable, CENT};
pub use computation::{ComputationInput, ComputationResult, DeductionKind};
pub use period::{CalculationMode, PeriodKey};
pub use policy::{DeductionPolicy, EngineConfig, RatePrecision};
