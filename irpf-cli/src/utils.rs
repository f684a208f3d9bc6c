//! Parsing and display helpers for amounts typed by users.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Digits with at most one separator, read as the decimal mark: `3000`,
/// `3000.50`, `3000,50`.
static PLAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:[.,]\d+)?$").expect("PLAIN regex is invalid"));

/// Dot-grouped thousands with an optional decimal comma: `3.000,50`.
static GROUPED_DOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,3}(?:\.\d{3})+(?:,\d+)?$").expect("GROUPED_DOT regex is invalid")
});

/// Comma-grouped thousands with an optional decimal point: `1,234.56`.
static GROUPED_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,3}(?:,\d{3})+(?:\.\d+)?$").expect("GROUPED_COMMA regex is invalid")
});

/// Error returned when a string cannot be read as an amount.
#[derive(Debug, Error)]
pub enum ParseDecimalError {
    #[error("invalid amount '{input}': use digits with a decimal point or comma")]
    Format { input: String },

    #[error("invalid amount '{input}': {source}")]
    Decimal {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

/// Rewrites `s` into the `1234.56` form accepted by [`Decimal`], or `None`
/// when no accepted layout matches. A leading `R$` and a leading `-` are
/// kept out of the match.
fn normalize_decimal_input(s: &str) -> Option<String> {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed).trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed),
    };

    let normalized = if PLAIN.is_match(digits) {
        digits.replace(',', ".")
    } else if GROUPED_DOT.is_match(digits) {
        digits.replace('.', "").replace(',', ".")
    } else if GROUPED_COMMA.is_match(digits) {
        digits.replace(',', "")
    } else {
        return None;
    };
    Some(format!("{sign}{normalized}"))
}

/// Parses a string into a [`Decimal`].
///
/// A single `.` or `,` is the decimal mark, so `3000,50` and `3000.50` are
/// equal. Grouped thousands are accepted in both conventions (`3.000,50`,
/// `1,234.56`). Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    if s.trim().is_empty() {
        return Ok(Decimal::ZERO);
    }
    let Some(normalized) = normalize_decimal_input(s) else {
        tracing::error!(input = %s, "unrecognised amount layout");
        return Err(ParseDecimalError::Format {
            input: s.to_string(),
        });
    };
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError::Decimal {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Inserts `.` between groups of three digits.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Formats a currency amount as Brazilian reais, e.g. `R$ 1.234,56`.
///
/// Negative amounts keep the sign after the symbol: `R$ -10,00`.
pub fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("R$ {sign}{},{cents}", group_thousands(whole))
}

/// Formats a percentage without trailing zeros, e.g. `7.5 %`.
pub fn format_percent(value: Decimal) -> String {
    format!("{} %", value.normalize())
}
