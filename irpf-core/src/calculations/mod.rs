//! Tax computation over the bracket tables in [`crate::registry`].

pub mod common;
pub mod engine;

use rust_decimal::Decimal;

pub use engine::{MAX_GROSS_AMOUNT, TaxEngine};

use crate::error::TaxError;
use crate::models::{CalculationMode, ComputationInput, ComputationResult, EngineConfig};

/// Computes tax with the built-in tables and the default [`EngineConfig`].
///
/// `mode` is `"monthly"` or `"annual"` (case-insensitive). `month` is only
/// read in monthly mode; callers without one should pass 1.
///
/// # Errors
///
/// Returns [`TaxError::InvalidArgument`] for an unknown mode, a negative
/// amount or dependent count, or a monthly computation with a month outside
/// 1..=12.
pub fn compute_tax(
    mode: &str,
    gross_amount: Decimal,
    dependent_count: i32,
    year: i32,
    month: u32,
) -> Result<ComputationResult, TaxError> {
    compute_tax_with(
        EngineConfig::default(),
        mode,
        gross_amount,
        dependent_count,
        year,
        month,
    )
}

/// Same as [`compute_tax`] with explicit engine policies.
pub fn compute_tax_with(
    config: EngineConfig,
    mode: &str,
    gross_amount: Decimal,
    dependent_count: i32,
    year: i32,
    month: u32,
) -> Result<ComputationResult, TaxError> {
    let input = match mode.parse::<CalculationMode>()? {
        CalculationMode::Monthly => {
            ComputationInput::monthly(gross_amount, dependent_count, year, month)
        }
        CalculationMode::Annual => ComputationInput::annual(gross_amount, dependent_count, year),
    };

    TaxEngine::with_builtin_tables(config).compute(&input)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{DeductionPolicy, RatePrecision};

    #[test]
    fn compute_tax_dispatches_monthly() {
        let result = compute_tax("monthly", dec!(3000.00), 0, 2023, 1).unwrap();

        assert_eq!(result.mode, CalculationMode::Monthly);
        assert_eq!(result.net_tax, dec!(42.60));
    }

    #[test]
    fn compute_tax_dispatches_annual_and_ignores_month() {
        let result = compute_tax("Annual", dec!(60000.00), 0, 2024, 7).unwrap();

        assert_eq!(result.mode, CalculationMode::Annual);
        assert_eq!(result.month, None);
        assert_eq!(result.net_tax, dec!(4021.80));
    }

    #[test]
    fn compute_tax_rejects_unknown_mode() {
        let result = compute_tax("weekly", dec!(3000.00), 0, 2024, 1);

        assert!(matches!(result, Err(TaxError::InvalidArgument(_))));
    }

    #[test]
    fn compute_tax_with_applies_config() {
        let config = EngineConfig {
            deduction_policy: DeductionPolicy::Presence,
            rate_precision: RatePrecision::Legacy,
        };

        let result = compute_tax_with(config, "monthly", dec!(5000.00), 1, 2024, 3).unwrap();

        assert_eq!(result.net_tax, dec!(426.86));
        assert_eq!(result.effective_rate, dec!(8.54));
    }
}
