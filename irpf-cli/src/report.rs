//! Rendering of computation results and bracket tables.

use std::io::{self, Write};

use clap::ValueEnum;
use irpf_core::{CalculationMode, ComputationResult, ScheduleSelection};
use rust_decimal::Decimal;

use crate::utils::{format_brl, format_percent};

/// How `compute` prints its result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Labelled lines with BRL amounts.
    #[default]
    Text,
    /// A header and one CSV row.
    Csv,
}

/// Writes the labelled result lines.
pub fn write_text<W: Write>(
    out: &mut W,
    result: &ComputationResult,
) -> io::Result<()> {
    let annual = result.mode == CalculationMode::Annual;
    let label = |monthly: &'static str, annual_label: &'static str| {
        if annual { annual_label } else { monthly }
    };

    writeln!(out, "Mode: {}", capitalize(result.mode.as_str()))?;
    writeln!(out, "Year: {}", result.year)?;
    if let Some(month) = result.month {
        writeln!(out, "Month: {month:02}")?;
    }
    writeln!(
        out,
        "{}: {}",
        label("Gross salary", "Annual taxable income"),
        format_brl(result.gross_amount)
    )?;
    writeln!(out, "Dependents: {}", result.dependent_count)?;
    writeln!(
        out,
        "{}: {}",
        label("Dependent deduction", "Dependent deduction (annual)"),
        format_brl(result.dependent_deduction)
    )?;
    writeln!(out, "Deduction applied: {}", result.deduction_label)?;
    writeln!(out, "Deduction amount: {}", format_brl(result.deduction_used))?;
    writeln!(
        out,
        "{}: {}",
        label("Taxable base", "Annual taxable base"),
        format_brl(result.taxable_base)
    )?;
    writeln!(out, "Bracket rate: {}", format_percent(result.rate_percent))?;
    writeln!(
        out,
        "{}: {}",
        label("Amount to subtract", "Annual amount to subtract"),
        format_brl(result.subtracted_amount)
    )?;
    writeln!(out, "Gross tax: {}", format_brl(result.gross_tax))?;
    writeln!(
        out,
        "{}: {}",
        label("Tax due", "Annual tax due"),
        format_brl(result.net_tax)
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "{}: {}",
        label("Net salary", "Annual net income"),
        format_brl(result.net_income)
    )?;
    writeln!(out, "Effective rate: {}", format_percent(result.effective_rate))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Writes a header row followed by one row per result. Nothing is written
/// for an empty slice.
pub fn write_csv<W: Write>(
    out: W,
    results: &[ComputationResult],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for result in results {
        writer.serialize(result)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a bracket table with its simplified and per-dependent deductions.
pub fn write_table<W: Write>(
    out: &mut W,
    title: &str,
    selection: &ScheduleSelection,
    dependent_deduction: Decimal,
) -> io::Result<()> {
    writeln!(out, "{title}")?;
    if selection.fallback {
        writeln!(out, "(year not in the tables; latest rates shown)")?;
    }
    writeln!(
        out,
        "  {:<16} {:<16} {:>7} {:>14}",
        "From", "To", "Rate", "Subtract"
    )?;
    for bracket in selection.table.brackets() {
        let upper = bracket
            .upper_bound
            .map_or_else(|| "and above".to_string(), format_brl);
        writeln!(
            out,
            "  {:<16} {:<16} {:>7} {:>14}",
            format_brl(bracket.lower_bound),
            upper,
            format_percent(bracket.rate_percent),
            format_brl(bracket.deduction)
        )?;
    }
    writeln!(
        out,
        "Simplified deduction: {}",
        format_brl(selection.simplified_deduction)
    )?;
    writeln!(
        out,
        "Per-dependent deduction: {}",
        format_brl(dependent_deduction)
    )
}

#[cfg(test)]
mod tests {
    use irpf_core::{TableRegistry, compute_tax};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn render(result: &ComputationResult) -> String {
        let mut out: Vec<u8> = Vec::new();
        write_text(&mut out, result).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn monthly_text_report() {
        let result = compute_tax("monthly", dec!(3000.00), 0, 2023, 1).unwrap();

        let text = render(&result);

        let expected = "\
Mode: Monthly
Year: 2023
Month: 01
Gross salary: R$ 3.000,00
Dependents: 0
Dependent deduction: R$ 0,00
Deduction applied: Simplified deduction
Deduction amount: R$ 528,00
Taxable base: R$ 2.472,00
Bracket rate: 7.5 %
Amount to subtract: R$ 142,80
Gross tax: R$ 185,40
Tax due: R$ 42,60

Net salary: R$ 2.957,40
Effective rate: 1.42 %
";
        assert_eq!(text, expected);
    }

    #[test]
    fn annual_text_report_uses_annual_labels() {
        let result = compute_tax("annual", dec!(60000.00), 0, 2024, 1).unwrap();

        let text = render(&result);

        assert!(!text.contains("Month:"));
        assert!(text.contains("Annual taxable income: R$ 60.000,00\n"));
        assert!(text.contains("Deduction applied: Simplified deduction (annual)\n"));
        assert!(text.contains("Annual tax due: R$ 4.021,80\n"));
        assert!(text.contains("Effective rate: 6.703 %\n"));
    }

    #[test]
    fn csv_has_header_and_one_row_per_result() {
        let results = vec![
            compute_tax("monthly", dec!(3000.00), 0, 2023, 1).unwrap(),
            compute_tax("annual", dec!(60000.00), 3, 2024, 1).unwrap(),
        ];
        let mut out: Vec<u8> = Vec::new();

        write_csv(&mut out, &results).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "mode,year,month,gross_amount,dependent_count,dependent_deduction,\
                 deduction_kind,deduction_label,deduction_used,taxable_base,rate_percent,\
                 subtracted_amount,gross_tax,net_tax,net_income,effective_rate"
            )
        );
        assert!(lines.next().unwrap().starts_with("monthly,2023,1,3000.00,0,"));
        assert!(lines.next().unwrap().starts_with("annual,2024,,60000.00,3,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_rows_read_back_into_results() {
        let results = vec![compute_tax("monthly", dec!(5000.00), 1, 2024, 3).unwrap()];
        let mut out: Vec<u8> = Vec::new();
        write_csv(&mut out, &results).unwrap();

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let read: Vec<ComputationResult> = reader.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(read, results);
    }

    #[test]
    fn table_lists_every_bracket() {
        let registry = TableRegistry::builtin();
        let selection = registry.resolve_monthly_table(2024, 3).unwrap();
        let mut out: Vec<u8> = Vec::new();

        write_table(
            &mut out,
            "Monthly table",
            &selection,
            registry.dependent_deduction_monthly(),
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1 + 1 + 5 + 2);
        assert!(text.contains("R$ 2.259,20"));
        assert!(text.contains("and above"));
        assert!(text.contains("Simplified deduction: R$ 564,80"));
        assert!(text.contains("Per-dependent deduction: R$ 189,59"));
        assert!(!text.contains("latest rates"));
    }

    #[test]
    fn table_flags_fallback_year() {
        let selection = TableRegistry::builtin().resolve_monthly_table(2030, 1).unwrap();
        let mut out: Vec<u8> = Vec::new();

        write_table(&mut out, "Monthly table", &selection, dec!(189.59)).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("latest rates shown"));
    }
}
