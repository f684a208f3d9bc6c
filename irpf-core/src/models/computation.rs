use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CalculationMode, PeriodKey};

/// Input to a single computation.
///
/// Fields are public so a caller can build one from already-validated form
/// data; the engine still rejects negative amounts and counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationInput {
    pub mode: CalculationMode,
    /// Monthly gross salary, or taxable annual income in annual mode.
    pub gross_amount: Decimal,
    pub dependent_count: i32,
    /// Only the year is used in annual mode.
    pub period: PeriodKey,
}

impl ComputationInput {
    pub fn monthly(
        gross_amount: Decimal,
        dependent_count: i32,
        year: i32,
        month: u32,
    ) -> Self {
        Self {
            mode: CalculationMode::Monthly,
            gross_amount,
            dependent_count,
            period: PeriodKey::new(year, month),
        }
    }

    pub fn annual(
        gross_amount: Decimal,
        dependent_count: i32,
        year: i32,
    ) -> Self {
        Self {
            mode: CalculationMode::Annual,
            gross_amount,
            dependent_count,
            period: PeriodKey::year_end(year),
        }
    }
}

/// Which deduction was subtracted from the gross amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionKind {
    Simplified,
    Dependents,
}

impl DeductionKind {
    /// Human-readable label, qualified with "(annual)" in annual mode.
    pub fn label(
        &self,
        mode: CalculationMode,
    ) -> String {
        let base = match self {
            Self::Simplified => "Simplified deduction",
            Self::Dependents => "Per-dependent deduction",
        };
        match mode {
            CalculationMode::Monthly => base.to_string(),
            CalculationMode::Annual => format!("{base} (annual)"),
        }
    }
}

impl fmt::Display for DeductionKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Simplified => f.write_str("simplified"),
            Self::Dependents => f.write_str("dependents"),
        }
    }
}

/// Every figure produced by one computation, plus the echoed inputs.
///
/// Currency amounts are rounded to two decimal places; `effective_rate` to
/// the precision configured on the engine. `net_income` is always exactly
/// `gross_amount - net_tax`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationResult {
    pub mode: CalculationMode,
    pub year: i32,
    /// `None` in annual mode.
    pub month: Option<u32>,
    pub gross_amount: Decimal,
    pub dependent_count: i32,

    /// Per-dependent deduction, whether or not it was the one applied.
    pub dependent_deduction: Decimal,
    pub deduction_kind: DeductionKind,
    pub deduction_label: String,
    pub deduction_used: Decimal,
    pub taxable_base: Decimal,

    /// Marginal rate of the bracket the taxable base fell into.
    pub rate_percent: Decimal,
    /// The bracket's "parcela a deduzir".
    pub subtracted_amount: Decimal,
    pub gross_tax: Decimal,
    pub net_tax: Decimal,
    pub net_income: Decimal,
    /// Net tax as a percentage of the gross amount.
    pub effective_rate: Decimal,
}
