//! The `compute`, `batch` and `tables` commands, independent of argument
//! parsing so they can be driven from tests.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use irpf_core::{CalculationMode, ComputationInput, ComputationResult, TableRegistry, TaxEngine};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::csv_loader;
use crate::report::{self, OutputFormat};
use crate::utils::parse_decimal;

/// Raw `compute` arguments, before validation.
#[derive(Debug, Clone)]
pub struct ComputeRequest {
    pub mode: String,
    pub gross: String,
    pub dependents: i32,
    pub year: i32,
    pub month: Option<u32>,
}

impl ComputeRequest {
    /// Parses the mode and amount. A missing month defaults to January.
    pub fn to_input(&self) -> Result<ComputationInput> {
        let mode = self.mode.parse::<CalculationMode>()?;
        let gross = parse_decimal(&self.gross)?;
        Ok(match mode {
            CalculationMode::Monthly => ComputationInput::monthly(
                gross,
                self.dependents,
                self.year,
                self.month.unwrap_or(1),
            ),
            CalculationMode::Annual => ComputationInput::annual(gross, self.dependents, self.year),
        })
    }
}

pub fn build_engine(config: &AppConfig) -> TaxEngine<'static> {
    debug!(
        policy = ?config.engine.deduction_policy,
        precision = ?config.engine.rate_precision,
        "engine configured"
    );
    TaxEngine::with_builtin_tables(config.engine)
}

pub fn run_compute<W: Write>(
    engine: &TaxEngine<'_>,
    request: &ComputeRequest,
    format: OutputFormat,
    out: &mut W,
) -> Result<ComputationResult> {
    let input = request.to_input()?;
    let result = engine.compute(&input)?;

    match format {
        OutputFormat::Text => report::write_text(out, &result)?,
        OutputFormat::Csv => report::write_csv(&mut *out, std::slice::from_ref(&result))?,
    }
    Ok(result)
}

/// Computes every row of `file`. Stops at the first row the engine rejects.
pub fn compute_batch(
    engine: &TaxEngine<'_>,
    file: &Path,
) -> Result<Vec<ComputationResult>> {
    let inputs = csv_loader::load_from_file(file)
        .with_context(|| format!("Failed to load batch input: {}", file.display()))?;
    debug!(rows = inputs.len(), file = %file.display(), "batch input loaded");

    let results = inputs
        .iter()
        .enumerate()
        .map(|(idx, input)| {
            engine
                .compute(input)
                .with_context(|| format!("row {}", idx + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    info!(rows = results.len(), "batch computed");
    Ok(results)
}

/// Computes every row of `file` and writes the results as CSV.
pub fn run_batch<W: Write>(
    engine: &TaxEngine<'_>,
    file: &Path,
    out: W,
) -> Result<Vec<ComputationResult>> {
    let results = compute_batch(engine, file)?;
    report::write_csv(out, &results).context("Failed to write batch results")?;
    Ok(results)
}

/// Like [`run_batch`], writing to `output`. The file is only created once
/// every row has computed, so a failed batch leaves it untouched.
pub fn run_batch_to_file(
    engine: &TaxEngine<'_>,
    file: &Path,
    output: &Path,
) -> Result<Vec<ComputationResult>> {
    let results = compute_batch(engine, file)?;

    let out = File::create(output)
        .with_context(|| format!("Failed to create: {}", output.display()))?;
    report::write_csv(BufWriter::new(out), &results)
        .with_context(|| format!("Failed to write batch results: {}", output.display()))?;
    debug!(output = %output.display(), "batch results written");
    Ok(results)
}

/// Prints the monthly table in force for `year`/`month`, or the derived
/// annual table when `annual` is set.
pub fn run_tables<W: Write>(
    registry: &TableRegistry,
    year: i32,
    month: Option<u32>,
    annual: bool,
    out: &mut W,
) -> Result<()> {
    let (title, selection) = if annual {
        let selection = registry.derive_annual_table(year);
        let title = format!(
            "Annual table for {year} (12 x monthly table effective from {})",
            selection.effective_from
        );
        (title, selection)
    } else {
        let month = month.unwrap_or(1);
        let selection = registry.resolve_monthly_table(year, month)?;
        let title = format!(
            "Monthly table for {year}-{month:02} (effective from {})",
            selection.effective_from
        );
        (title, selection)
    };

    let mode = if annual {
        CalculationMode::Annual
    } else {
        CalculationMode::Monthly
    };
    let dependent_deduction =
        registry.dependent_deduction_monthly() * Decimal::from(mode.scale());

    report::write_table(out, &title, &selection, dependent_deduction)?;
    writeln!(
        out,
        "Known years: {}",
        registry
            .known_years()
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    )?;
    Ok(())
}
