//! Hardcoded IRRF bracket tables and deduction constants.
//!
//! Tables are kept on a timeline of effective dates. A month is taxed by the
//! latest table that took effect on or before it, so a year whose new table
//! starts mid-year uses the predecessor table for its first months.
//!
//! | Effective from | Exempt up to | Notes |
//! |----------------|--------------|-------|
//! | 2023-01        | 1903.98      | table in force until April 2023 |
//! | 2023-05        | 2112.00      | |
//! | 2024-02        | 2259.20      | also used for 2025 |
//!
//! The simplified monthly deduction is 528.00 in 2023 and 564.80 in 2024 and
//! 2025. The per-dependent monthly deduction is 189.59 in every year.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{TableError, TaxError};
use crate::models::{Bracket, BracketTable, CalculationMode, PeriodKey};

/// Monthly deduction per dependent, fixed across all years.
pub const DEPENDENT_DEDUCTION_MONTHLY: Decimal = Decimal::from_parts(18959, 0, 0, false, 2);

/// Simplified monthly deduction for years without an explicit entry that
/// precede the last known year.
pub const DEFAULT_SIMPLIFIED_DEDUCTION_MONTHLY: Decimal =
    Decimal::from_parts(52800, 0, 0, false, 2);

type BracketRow = (i64, Option<i64>, i64, i64);

// (lower cents, upper cents, rate tenths of a percent, deduction cents)
const TABLE_2023_JAN: [BracketRow; 5] = [
    (0, Some(190398), 0, 0),
    (190399, Some(282665), 75, 14280),
    (282666, Some(375105), 150, 35480),
    (375106, Some(466468), 225, 63613),
    (466469, None, 275, 86936),
];

const TABLE_2023_MAY: [BracketRow; 5] = [
    (0, Some(211200), 0, 0),
    (211201, Some(282665), 75, 15840),
    (282666, Some(375105), 150, 37040),
    (375106, Some(466468), 225, 65173),
    (466469, None, 275, 88496),
];

const TABLE_2024_FEB: [BracketRow; 5] = [
    (0, Some(225920), 0, 0),
    (225921, Some(282665), 75, 16944),
    (282666, Some(375105), 150, 38144),
    (375106, Some(466468), 225, 66277),
    (466469, None, 275, 89600),
];

const SIMPLIFIED_MONTHLY_BY_YEAR: [(i32, i64); 3] = [(2023, 52800), (2024, 56480), (2025, 56480)];

fn table_from_rows(rows: &[BracketRow]) -> BracketTable {
    BracketTable::new(
        rows.iter()
            .map(|&(lower, upper, rate, deduction)| Bracket {
                lower_bound: Decimal::new(lower, 2),
                upper_bound: upper.map(|u| Decimal::new(u, 2)),
                rate_percent: Decimal::new(rate, 1),
                deduction: Decimal::new(deduction, 2),
            })
            .collect(),
    )
}

static BUILTIN: LazyLock<TableRegistry> = LazyLock::new(|| TableRegistry {
    periods: vec![
        TablePeriod {
            effective_from: PeriodKey::new(2023, 1),
            table: table_from_rows(&TABLE_2023_JAN),
        },
        TablePeriod {
            effective_from: PeriodKey::new(2023, 5),
            table: table_from_rows(&TABLE_2023_MAY),
        },
        TablePeriod {
            effective_from: PeriodKey::new(2024, 2),
            table: table_from_rows(&TABLE_2024_FEB),
        },
    ],
    simplified_by_year: SIMPLIFIED_MONTHLY_BY_YEAR
        .iter()
        .map(|&(year, cents)| (year, Decimal::new(cents, 2)))
        .collect(),
});

/// A bracket table together with the date it takes effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePeriod {
    pub effective_from: PeriodKey,
    pub table: BracketTable,
}

/// The table and simplified deduction selected for a computation.
///
/// In annual mode both are already scaled by 12.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSelection {
    pub effective_from: PeriodKey,
    pub table: BracketTable,
    pub simplified_deduction: Decimal,
    /// True when the requested year is unknown and the latest table was
    /// used instead.
    pub fallback: bool,
}

/// Immutable lookup of bracket tables keyed by effective period, and of
/// simplified deductions keyed by year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRegistry {
    /// Sorted by `effective_from`, never empty.
    periods: Vec<TablePeriod>,
    simplified_by_year: BTreeMap<i32, Decimal>,
}

impl TableRegistry {
    /// Builds a registry from arbitrary periods, validating every table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NoTables`] when `periods` is empty, or
    /// [`TableError::InPeriod`] wrapping the first coverage violation found.
    pub fn new(
        mut periods: Vec<TablePeriod>,
        simplified_by_year: BTreeMap<i32, Decimal>,
    ) -> Result<Self, TableError> {
        if periods.is_empty() {
            return Err(TableError::NoTables);
        }
        periods.sort_by_key(|p| p.effective_from);

        let registry = Self {
            periods,
            simplified_by_year,
        };
        registry.validate()?;
        Ok(registry)
    }

    /// The hardcoded Receita Federal tables for 2023 to 2025.
    pub fn builtin() -> &'static TableRegistry {
        &BUILTIN
    }

    pub fn periods(&self) -> &[TablePeriod] {
        &self.periods
    }

    /// Checks the coverage invariant on every table.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.periods.is_empty() {
            return Err(TableError::NoTables);
        }
        for period in &self.periods {
            period
                .table
                .validate()
                .map_err(|source| TableError::InPeriod {
                    effective_from: period.effective_from,
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }

    /// Years with an explicit simplified-deduction entry, ascending.
    pub fn known_years(&self) -> Vec<i32> {
        self.simplified_by_year.keys().copied().collect()
    }

    pub fn is_known_year(
        &self,
        year: i32,
    ) -> bool {
        self.simplified_by_year.contains_key(&year)
    }

    /// Per-dependent deduction for one month.
    pub fn dependent_deduction_monthly(&self) -> Decimal {
        DEPENDENT_DEDUCTION_MONTHLY
    }

    /// Simplified monthly deduction for `year`.
    ///
    /// Years after the last known year keep the latest amount, matching the
    /// table fallback. Earlier unlisted years get
    /// [`DEFAULT_SIMPLIFIED_DEDUCTION_MONTHLY`].
    pub fn simplified_monthly(
        &self,
        year: i32,
    ) -> Decimal {
        if let Some(amount) = self.simplified_by_year.get(&year) {
            return *amount;
        }
        match self.simplified_by_year.last_key_value() {
            Some((&last_year, &amount)) if year > last_year => amount,
            _ => DEFAULT_SIMPLIFIED_DEDUCTION_MONTHLY,
        }
    }

    /// Selects the monthly table in force in `year`/`month` and the
    /// simplified monthly deduction for `year`.
    ///
    /// Unknown years never fail: they use the most recent table.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidArgument`] if `month` is outside 1..=12.
    pub fn resolve_monthly_table(
        &self,
        year: i32,
        month: u32,
    ) -> Result<ScheduleSelection, TaxError> {
        let key = PeriodKey::new(year, month);
        key.validate()?;
        Ok(self.select(key))
    }

    /// Builds the annual schedule for `year` by scaling the table in force in
    /// December, and the simplified deduction, by 12.
    pub fn derive_annual_table(
        &self,
        year: i32,
    ) -> ScheduleSelection {
        let scale = CalculationMode::Annual.scale();
        let monthly = self.select(PeriodKey::year_end(year));

        ScheduleSelection {
            effective_from: monthly.effective_from,
            table: monthly.table.scaled(scale),
            simplified_deduction: monthly.simplified_deduction * Decimal::from(scale),
            fallback: monthly.fallback,
        }
    }

    /// Dispatches to [`Self::resolve_monthly_table`] or
    /// [`Self::derive_annual_table`]. The month is ignored in annual mode.
    pub fn resolve(
        &self,
        mode: CalculationMode,
        period: PeriodKey,
    ) -> Result<ScheduleSelection, TaxError> {
        match mode {
            CalculationMode::Monthly => self.resolve_monthly_table(period.year, period.month),
            CalculationMode::Annual => Ok(self.derive_annual_table(period.year)),
        }
    }

    /// `key` must hold a valid month.
    fn select(
        &self,
        key: PeriodKey,
    ) -> ScheduleSelection {
        let (period, fallback) = if self.is_known_year(key.year) {
            let period = self
                .periods
                .iter()
                .rev()
                .find(|p| p.effective_from <= key)
                .unwrap_or_else(|| self.earliest());
            (period, false)
        } else {
            let latest = self.latest();
            warn!(
                %key,
                effective_from = %latest.effective_from,
                "no table registered for year, using most recent rates"
            );
            (latest, true)
        };

        debug!(%key, effective_from = %period.effective_from, "resolved monthly table");

        ScheduleSelection {
            effective_from: period.effective_from,
            table: period.table.clone(),
            simplified_deduction: self.simplified_monthly(key.year),
            fallback,
        }
    }

    fn earliest(&self) -> &TablePeriod {
        &self.periods[0]
    }

    fn latest(&self) -> &TablePeriod {
        &self.periods[self.periods.len() - 1]
    }
}
