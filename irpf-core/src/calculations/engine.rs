//! IRRF / simplified IRPF computation.
//!
//! # Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Per-dependent deduction: dependents × 189.59 (× 12 when annual) |
//! | 2    | Deduction used: per-dependent or simplified, per [`DeductionPolicy`] |
//! | 3    | Taxable base: gross amount − deduction used (may be negative) |
//! | 4    | Bracket lookup; a negative base is taxed at 0% |
//! | 5    | Gross tax: base × rate / 100 |
//! | 6    | Net tax: gross tax − bracket deduction, minimum 0 |
//! | 7    | Net income: gross amount − net tax |
//! | 8    | Effective rate: net tax / gross amount × 100 (0 when gross is 0) |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use irpf_core::{ComputationInput, DeductionKind, EngineConfig, TableRegistry, TaxEngine};
//!
//! let engine = TaxEngine::new(TableRegistry::builtin(), EngineConfig::default());
//! let input = ComputationInput::annual(dec!(60000.00), 0, 2024);
//!
//! let result = engine.compute(&input).unwrap();
//!
//! assert_eq!(result.deduction_kind, DeductionKind::Simplified);
//! assert_eq!(result.deduction_used, dec!(6777.60));
//! assert_eq!(result.net_tax, dec!(4021.80));
//! assert_eq!(result.effective_rate, dec!(6.7030));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{max, round_currency, round_rate};
use crate::error::TaxError;
use crate::models::{
    BracketTable, ComputationInput, ComputationResult, DeductionKind, DeductionPolicy,
    EngineConfig,
};
use crate::registry::TableRegistry;

/// Largest gross amount the engine accepts (one quadrillion).
pub const MAX_GROSS_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Calculator bound to a table registry and a fixed [`EngineConfig`].
///
/// Holds no mutable state; one engine can serve any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    registry: &'a TableRegistry,
    config: EngineConfig,
}

impl TaxEngine<'static> {
    /// An engine over [`TableRegistry::builtin`].
    pub fn with_builtin_tables(config: EngineConfig) -> Self {
        Self::new(TableRegistry::builtin(), config)
    }
}

impl<'a> TaxEngine<'a> {
    pub fn new(
        registry: &'a TableRegistry,
        config: EngineConfig,
    ) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Runs the full computation for `input`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidArgument`] if the gross amount or the
    /// dependent count is negative, or if a monthly computation names a month
    /// outside 1..=12.
    pub fn compute(
        &self,
        input: &ComputationInput,
    ) -> Result<ComputationResult, TaxError> {
        self.validate_input(input)?;

        let schedule = self.registry.resolve(input.mode, input.period)?;
        let scale = Decimal::from(input.mode.scale());

        let dependent_deduction = self.dependent_deduction(input.dependent_count, scale);
        let (deduction_kind, deduction_used) = self.choose_deduction(
            input.dependent_count,
            dependent_deduction,
            schedule.simplified_deduction,
        );
        debug!(
            mode = %input.mode,
            kind = %deduction_kind,
            %deduction_used,
            simplified = %schedule.simplified_deduction,
            "chose deduction"
        );

        let gross_amount = round_currency(input.gross_amount);
        let taxable_base = self.taxable_base(gross_amount, deduction_used);
        let (rate_percent, subtracted_amount) = self.bracket_terms(&schedule.table, taxable_base);
        let gross_tax = self.gross_tax(taxable_base, rate_percent);
        let net_tax = self.net_tax(gross_tax, subtracted_amount);
        let effective_rate = self.effective_rate(net_tax, gross_amount);

        let net_tax_rounded = round_currency(net_tax);

        Ok(ComputationResult {
            mode: input.mode,
            year: input.period.year,
            month: input.mode.is_monthly().then_some(input.period.month),
            gross_amount,
            dependent_count: input.dependent_count,
            dependent_deduction: round_currency(dependent_deduction),
            deduction_kind,
            deduction_label: deduction_kind.label(input.mode),
            deduction_used: round_currency(deduction_used),
            taxable_base,
            rate_percent,
            subtracted_amount: round_currency(subtracted_amount),
            gross_tax: round_currency(gross_tax),
            net_tax: net_tax_rounded,
            net_income: self.net_income(gross_amount, net_tax_rounded),
            effective_rate,
        })
    }

    /// Rejects negative amounts and counts, and gross amounts above
    /// [`MAX_GROSS_AMOUNT`], so no later step can overflow.
    fn validate_input(
        &self,
        input: &ComputationInput,
    ) -> Result<(), TaxError> {
        if input.gross_amount < Decimal::ZERO {
            return Err(TaxError::invalid(format!(
                "gross amount must not be negative, got {}",
                input.gross_amount
            )));
        }
        if input.gross_amount > MAX_GROSS_AMOUNT {
            return Err(TaxError::invalid(format!(
                "gross amount must not exceed {MAX_GROSS_AMOUNT}, got {}",
                input.gross_amount
            )));
        }
        if input.dependent_count < 0 {
            return Err(TaxError::invalid(format!(
                "dependent count must not be negative, got {}",
                input.dependent_count
            )));
        }
        Ok(())
    }

    /// Per-dependent deduction for the period (step 1).
    fn dependent_deduction(
        &self,
        dependent_count: i32,
        scale: Decimal,
    ) -> Decimal {
        Decimal::from(dependent_count) * self.registry.dependent_deduction_monthly() * scale
    }

    /// Picks the deduction to subtract (step 2).
    fn choose_deduction(
        &self,
        dependent_count: i32,
        dependent_deduction: Decimal,
        simplified: Decimal,
    ) -> (DeductionKind, Decimal) {
        let use_dependents = match self.config.deduction_policy {
            DeductionPolicy::Threshold => dependent_deduction > simplified,
            DeductionPolicy::Presence => dependent_count > 0,
        };

        if use_dependents {
            (DeductionKind::Dependents, dependent_deduction)
        } else {
            (DeductionKind::Simplified, simplified)
        }
    }

    /// Gross amount minus the deduction, not floored (step 3).
    ///
    /// Rounded to the cent so it always lands inside a cent-granular bracket.
    fn taxable_base(
        &self,
        gross_amount: Decimal,
        deduction_used: Decimal,
    ) -> Decimal {
        round_currency(gross_amount - deduction_used)
    }

    /// Rate and deduction of the bracket taxing `taxable_base` (step 4).
    fn bracket_terms(
        &self,
        table: &BracketTable,
        taxable_base: Decimal,
    ) -> (Decimal, Decimal) {
        match table.find(taxable_base) {
            Some(bracket) => (bracket.rate_percent, bracket.deduction),
            None => (Decimal::ZERO, Decimal::ZERO),
        }
    }

    /// Step 5.
    fn gross_tax(
        &self,
        taxable_base: Decimal,
        rate_percent: Decimal,
    ) -> Decimal {
        taxable_base * rate_percent / Decimal::ONE_HUNDRED
    }

    /// Step 6; never negative.
    fn net_tax(
        &self,
        gross_tax: Decimal,
        subtracted_amount: Decimal,
    ) -> Decimal {
        max(gross_tax - subtracted_amount, Decimal::ZERO)
    }

    /// Step 7, on already-rounded figures so the identity holds exactly.
    fn net_income(
        &self,
        gross_amount: Decimal,
        net_tax: Decimal,
    ) -> Decimal {
        gross_amount - net_tax
    }

    /// Step 8, rounded to the configured precision.
    fn effective_rate(
        &self,
        net_tax: Decimal,
        gross_amount: Decimal,
    ) -> Decimal {
        if gross_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        round_rate(
            net_tax / gross_amount * Decimal::ONE_HUNDRED,
            self.config.rate_precision.decimal_places(),
        )
    }
}
