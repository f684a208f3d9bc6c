//! CSV loader for batch computation input.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter.
//!
//! | Column         | Required | Type    | Notes                                           |
//! |----------------|----------|---------|-------------------------------------------------|
//! | `mode`         | yes      | string  | `monthly` or `annual`, case-insensitive         |
//! | `gross_amount` | yes      | decimal | Same layouts as `--gross`; quote `3.000,50`     |
//! | `dependents`   | no       | integer | Empty means 0                                   |
//! | `year`         | yes      | integer | e.g. `2024`                                     |
//! | `month`        | no       | integer | 1-12, monthly rows only; empty means January    |
//!
//! ### Example
//!
//! ```csv
//! mode,gross_amount,dependents,year,month
//! monthly,3000.00,0,2023,1
//! monthly,"5.000,00",1,2024,3
//! annual,60000.00,3,2024,
//! ```

use std::path::Path;

use irpf_core::{CalculationMode, ComputationInput};
use serde::Deserialize;

use crate::utils::{ParseDecimalError, parse_decimal};

#[derive(Debug, Deserialize)]
struct CsvRow {
    mode: String,
    gross_amount: String,
    dependents: Option<i32>,
    year: i32,
    month: Option<u32>,
}

/// Errors that can occur while loading batch input.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    #[error("cannot read batch file: {0}")]
    Io(#[from] std::io::Error),

    /// Bad structure, missing required column, or a non-numeric year,
    /// month or dependent count.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `row` is 1-based, the header is not counted.
    #[error("unrecognised mode '{mode}' on row {row}")]
    InvalidMode { mode: String, row: usize },

    #[error("row {row}: {source}")]
    InvalidAmount {
        row: usize,
        #[source]
        source: ParseDecimalError,
    },
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<ComputationInput, CsvLoadError> {
    let mode = match row.mode.parse::<CalculationMode>() {
        Ok(mode) => mode,
        Err(_) => {
            return Err(CsvLoadError::InvalidMode {
                mode: row.mode,
                row: row_number,
            });
        }
    };
    let gross_amount =
        parse_decimal(&row.gross_amount).map_err(|source| CsvLoadError::InvalidAmount {
            row: row_number,
            source,
        })?;
    let dependents = row.dependents.unwrap_or(0);

    Ok(match mode {
        CalculationMode::Monthly => {
            ComputationInput::monthly(gross_amount, dependents, row.year, row.month.unwrap_or(1))
        }
        CalculationMode::Annual => ComputationInput::annual(gross_amount, dependents, row.year),
    })
}

/// Parses CSV text into computation inputs, in file order.
///
/// Rows are only checked for shape here; negative amounts and out-of-range
/// months are reported by the engine.
///
/// # Errors
///
/// * [`CsvLoadError::Parse`] if the CSV is structurally invalid.
/// * [`CsvLoadError::InvalidMode`] for a mode other than monthly/annual.
/// * [`CsvLoadError::InvalidAmount`] for an unreadable `gross_amount`.
pub fn load_from_str(input: &str) -> Result<Vec<ComputationInput>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| convert_row(result?, idx + 1))
        .collect()
}

/// Reads `path` and delegates to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<ComputationInput>, CsvLoadError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents)
}
