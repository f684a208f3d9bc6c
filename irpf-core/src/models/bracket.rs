use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Distance between the upper bound of one bracket and the lower bound of the
/// next in tables published in cents.
pub const CENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// One progressive-tax income range.
///
/// The tax owed inside a bracket is `base * rate_percent / 100 - deduction`,
/// the "parcela a deduzir" form used by the Receita Federal tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub lower_bound: Decimal,
    /// `None` for the open-ended top bracket.
    pub upper_bound: Option<Decimal>,
    pub rate_percent: Decimal,
    pub deduction: Decimal,
}

impl Bracket {
    /// Whether `amount` lies inside `[lower_bound, upper_bound]`, both ends
    /// inclusive.
    pub fn contains(
        &self,
        amount: Decimal,
    ) -> bool {
        amount >= self.lower_bound && self.upper_bound.is_none_or(|upper| amount <= upper)
    }

    /// Multiplies both bounds and the deduction by `factor`. The rate is left
    /// untouched.
    pub fn scaled(
        &self,
        factor: Decimal,
    ) -> Self {
        Self {
            lower_bound: self.lower_bound * factor,
            upper_bound: self.upper_bound.map(|upper| upper * factor),
            rate_percent: self.rate_percent,
            deduction: self.deduction * factor,
        }
    }
}

/// An ordered set of brackets covering `[0, +infinity)`.
///
/// Consecutive brackets are separated by `step`: the next lower bound is the
/// previous upper bound plus `step`. Monthly tables use a step of one cent;
/// [`BracketTable::scaled`] scales the step along with the bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTable {
    brackets: Vec<Bracket>,
    step: Decimal,
}

impl BracketTable {
    /// Creates a table published in cents.
    ///
    /// Brackets should be sorted by `lower_bound`; call
    /// [`BracketTable::validate`] to check the coverage invariant.
    pub fn new(brackets: Vec<Bracket>) -> Self {
        Self {
            brackets,
            step: CENT,
        }
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    pub fn step(&self) -> Decimal {
        self.step
    }

    /// Returns a copy with every bound, every deduction and the step
    /// multiplied by `factor`.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use irpf_core::{Bracket, BracketTable};
    ///
    /// let monthly = BracketTable::new(vec![
    ///     Bracket { lower_bound: dec!(0), upper_bound: Some(dec!(1903.98)), rate_percent: dec!(0), deduction: dec!(0) },
    ///     Bracket { lower_bound: dec!(1903.99), upper_bound: None, rate_percent: dec!(7.5), deduction: dec!(142.80) },
    /// ]);
    ///
    /// let annual = monthly.scaled(12);
    ///
    /// assert_eq!(annual.brackets()[0].upper_bound, Some(dec!(22847.76)));
    /// assert_eq!(annual.brackets()[1].deduction, dec!(1713.60));
    /// assert_eq!(annual.brackets()[1].rate_percent, dec!(7.5));
    /// ```
    pub fn scaled(
        &self,
        factor: u32,
    ) -> Self {
        let factor = Decimal::from(factor);
        Self {
            brackets: self.brackets.iter().map(|b| b.scaled(factor)).collect(),
            step: self.step * factor,
        }
    }

    /// Finds the bracket that taxes `amount`.
    ///
    /// Amounts below the first lower bound (a negative taxable base) have no
    /// bracket. Otherwise the first bracket whose upper bound is not exceeded
    /// wins, so amounts falling between two brackets of a scaled table are
    /// taxed by the higher one. A strict containment lookup would find no
    /// bracket there and tax them at 0%; this one never does for a
    /// non-negative amount.
    pub fn find(
        &self,
        amount: Decimal,
    ) -> Option<&Bracket> {
        let first = self.brackets.first()?;
        if amount < first.lower_bound {
            return None;
        }

        self.brackets
            .iter()
            .find(|b| b.upper_bound.is_none_or(|upper| amount <= upper))
    }

    /// Checks that the brackets partition `[0, +infinity)` with no gaps and
    /// no overlaps at this table's step.
    ///
    /// # Errors
    ///
    /// Returns the first [`TableError`] found, scanning from the lowest
    /// bracket.
    pub fn validate(&self) -> Result<(), TableError> {
        let first = self.brackets.first().ok_or(TableError::Empty)?;
        if !first.lower_bound.is_zero() {
            return Err(TableError::DoesNotStartAtZero(first.lower_bound));
        }

        let last_index = self.brackets.len() - 1;
        let mut expected_lower = Decimal::ZERO;

        for (index, bracket) in self.brackets.iter().enumerate() {
            if bracket.lower_bound != expected_lower {
                return Err(TableError::NotContiguous {
                    index,
                    lower: bracket.lower_bound,
                    expected: expected_lower,
                });
            }

            match bracket.upper_bound {
                Some(upper) if index == last_index => {
                    return Err(TableError::ClosedLastBracket(upper));
                }
                Some(upper) if upper < bracket.lower_bound => {
                    return Err(TableError::InvertedBounds {
                        index,
                        lower: bracket.lower_bound,
                        upper,
                    });
                }
                Some(upper) => expected_lower = upper + self.step,
                None if index != last_index => {
                    return Err(TableError::OpenEndedBeforeLast { index });
                }
                None => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn bracket(
        lower: Decimal,
        upper: Option<Decimal>,
        rate: Decimal,
        deduction: Decimal,
    ) -> Bracket {
        Bracket {
            lower_bound: lower,
            upper_bound: upper,
            rate_percent: rate,
            deduction,
        }
    }

    fn legacy_table() -> BracketTable {
        BracketTable::new(vec![
            bracket(dec!(0.00), Some(dec!(1903.98)), dec!(0), dec!(0.00)),
            bracket(dec!(1903.99), Some(dec!(2826.65)), dec!(7.5), dec!(142.80)),
            bracket(dec!(2826.66), Some(dec!(3751.05)), dec!(15), dec!(354.80)),
            bracket(dec!(3751.06), Some(dec!(4664.68)), dec!(22.5), dec!(636.13)),
            bracket(dec!(4664.69), None, dec!(27.5), dec!(869.36)),
        ])
    }

    // =========================================================================
    // contains tests
    // =========================================================================

    #[test]
    fn contains_includes_both_bounds() {
        let b = bracket(dec!(1903.99), Some(dec!(2826.65)), dec!(7.5), dec!(142.80));

        assert!(b.contains(dec!(1903.99)));
        assert!(b.contains(dec!(2826.65)));
        assert!(!b.contains(dec!(2826.66)));
        assert!(!b.contains(dec!(1903.98)));
    }

    #[test]
    fn contains_open_ended_bracket() {
        let b = bracket(dec!(4664.69), None, dec!(27.5), dec!(869.36));

        assert!(b.contains(dec!(1000000000.00)));
    }

    // =========================================================================
    // find tests
    // =========================================================================

    #[test]
    fn find_returns_bracket_containing_amount() {
        let table = legacy_table();

        let found = table.find(dec!(2472.00)).unwrap();

        assert_eq!(found.rate_percent, dec!(7.5));
        assert_eq!(found.deduction, dec!(142.80));
    }

    #[test]
    fn find_returns_first_bracket_for_zero() {
        let table = legacy_table();

        let found = table.find(dec!(0.00)).unwrap();

        assert_eq!(found.rate_percent, dec!(0));
    }

    #[test]
    fn find_returns_none_for_negative_amount() {
        let table = legacy_table();

        assert_eq!(table.find(dec!(-0.01)), None);
    }

    #[test]
    fn find_returns_top_bracket_for_large_amount() {
        let table = legacy_table();

        let found = table.find(dec!(99999.99)).unwrap();

        assert_eq!(found.rate_percent, dec!(27.5));
    }

    #[test]
    fn find_returns_none_for_empty_table() {
        let table = BracketTable::new(vec![]);

        assert_eq!(table.find(dec!(100.00)), None);
    }

    #[test]
    fn find_taxes_gap_of_scaled_table_with_higher_bracket() {
        let annual = legacy_table().scaled(12);

        // 2826.65 * 12 = 33919.80 and 2826.66 * 12 = 33919.92
        let found = annual.find(dec!(33919.85)).unwrap();

        assert_eq!(found.rate_percent, dec!(15));
    }

    // =========================================================================
    // scaled tests
    // =========================================================================

    #[test]
    fn scaled_multiplies_bounds_and_deductions() {
        let annual = legacy_table().scaled(12);
        let second = &annual.brackets()[1];

        assert_eq!(second.lower_bound, dec!(22847.88));
        assert_eq!(second.upper_bound, Some(dec!(33919.80)));
        assert_eq!(second.deduction, dec!(1713.60));
        assert_eq!(second.rate_percent, dec!(7.5));
    }

    #[test]
    fn scaled_keeps_top_bracket_open() {
        let annual = legacy_table().scaled(12);

        assert_eq!(annual.brackets()[4].upper_bound, None);
    }

    #[test]
    fn scaled_multiplies_step() {
        let annual = legacy_table().scaled(12);

        assert_eq!(annual.step(), dec!(0.12));
    }

    // =========================================================================
    // validate tests
    // =========================================================================

    #[test]
    fn validate_accepts_contiguous_table() {
        assert_eq!(legacy_table().validate(), Ok(()));
    }

    #[test]
    fn validate_accepts_scaled_table() {
        assert_eq!(legacy_table().scaled(12).validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_empty_table() {
        let table = BracketTable::new(vec![]);

        assert_eq!(table.validate(), Err(TableError::Empty));
    }

    #[test]
    fn validate_rejects_table_not_starting_at_zero() {
        let table = BracketTable::new(vec![bracket(dec!(10.00), None, dec!(0), dec!(0))]);

        assert_eq!(
            table.validate(),
            Err(TableError::DoesNotStartAtZero(dec!(10.00)))
        );
    }

    #[test]
    fn validate_rejects_gap() {
        let table = BracketTable::new(vec![
            bracket(dec!(0.00), Some(dec!(1000.00)), dec!(0), dec!(0)),
            bracket(dec!(1000.05), None, dec!(10), dec!(100.00)),
        ]);

        assert_eq!(
            table.validate(),
            Err(TableError::NotContiguous {
                index: 1,
                lower: dec!(1000.05),
                expected: dec!(1000.01),
            })
        );
    }

    #[test]
    fn validate_rejects_overlap() {
        let table = BracketTable::new(vec![
            bracket(dec!(0.00), Some(dec!(1000.00)), dec!(0), dec!(0)),
            bracket(dec!(900.00), None, dec!(10), dec!(100.00)),
        ]);

        assert!(matches!(
            table.validate(),
            Err(TableError::NotContiguous { index: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_closed_last_bracket() {
        let table = BracketTable::new(vec![bracket(
            dec!(0.00),
            Some(dec!(1000.00)),
            dec!(0),
            dec!(0),
        )]);

        assert_eq!(
            table.validate(),
            Err(TableError::ClosedLastBracket(dec!(1000.00)))
        );
    }

    #[test]
    fn validate_rejects_open_bracket_before_last() {
        let table = BracketTable::new(vec![
            bracket(dec!(0.00), None, dec!(0), dec!(0)),
            bracket(dec!(1000.01), None, dec!(10), dec!(100.00)),
        ]);

        assert_eq!(
            table.validate(),
            Err(TableError::OpenEndedBeforeLast { index: 0 })
        );
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let table = BracketTable::new(vec![
            bracket(dec!(0.00), Some(dec!(-5.00)), dec!(0), dec!(0)),
            bracket(dec!(-4.99), None, dec!(10), dec!(0)),
        ]);

        assert_eq!(
            table.validate(),
            Err(TableError::InvertedBounds {
                index: 0,
                lower: dec!(0.00),
                upper: dec!(-5.00),
            })
        );
    }
}
