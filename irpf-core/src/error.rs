use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::PeriodKey;

/// Errors surfaced by the tax engine.
///
/// Unknown years are not an error: the registry degrades to the most recent
/// known rates instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl TaxError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Violations of the bracket coverage invariant found by
/// [`crate::BracketTable::validate`] and [`crate::TableRegistry::new`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("registry has no bracket tables")]
    NoTables,

    #[error("table effective from {effective_from}: {source}")]
    InPeriod {
        effective_from: PeriodKey,
        source: Box<TableError>,
    },

    #[error("bracket table is empty")]
    Empty,

    #[error("first bracket starts at {0}, expected 0")]
    DoesNotStartAtZero(Decimal),

    #[error("bracket {index} has lower bound {lower} above its upper bound {upper}")]
    InvertedBounds {
        index: usize,
        lower: Decimal,
        upper: Decimal,
    },

    #[error("bracket {index} is open-ended but is not the last bracket")]
    OpenEndedBeforeLast { index: usize },

    #[error("last bracket is capped at {0}, expected an open upper bound")]
    ClosedLastBracket(Decimal),

    #[error("bracket {index} starts at {lower}, expected {expected}")]
    NotContiguous {
        index: usize,
        lower: Decimal,
        expected: Decimal,
    },
}
