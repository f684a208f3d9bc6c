use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TaxError;

/// Whether the computation covers one month of withholding or a full year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMode {
    Monthly,
    Annual,
}

impl CalculationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    pub fn is_monthly(&self) -> bool {
        matches!(self, Self::Monthly)
    }

    /// Number of monthly periods the mode spans; monthly tables and
    /// constants are multiplied by this for the annual computation.
    pub fn scale(&self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Annual => 12,
        }
    }
}

impl fmt::Display for CalculationMode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculationMode {
    type Err = TaxError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "annual" => Ok(Self::Annual),
            _ => Err(TaxError::invalid(format!(
                "mode must be 'monthly' or 'annual', got '{s}'"
            ))),
        }
    }
}

/// A calendar month, used both to select the table in force and to record
/// when a table takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    pub year: i32,
    pub month: u32,
}

impl PeriodKey {
    pub const fn new(
        year: i32,
        month: u32,
    ) -> Self {
        Self { year, month }
    }

    /// Last month of `year`; the annual computation uses the table in force
    /// at this point.
    pub const fn year_end(year: i32) -> Self {
        Self { year, month: 12 }
    }

    pub fn validate(&self) -> Result<(), TaxError> {
        if (1..=12).contains(&self.month) {
            Ok(())
        } else {
            Err(TaxError::invalid(format!(
                "month must be between 1 and 12, got {}",
                self.month
            )))
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn mode_parses_known_values() {
        assert_eq!("monthly".parse::<CalculationMode>(), Ok(CalculationMode::Monthly));
        assert_eq!("annual".parse::<CalculationMode>(), Ok(CalculationMode::Annual));
    }

    #[test]
    fn mode_parse_is_case_insensitive() {
        assert_eq!(" Monthly ".parse::<CalculationMode>(), Ok(CalculationMode::Monthly));
        assert_eq!("ANNUAL".parse::<CalculationMode>(), Ok(CalculationMode::Annual));
    }

    #[test]
    fn mode_parse_rejects_unknown_value() {
        let result = "weekly".parse::<CalculationMode>();

        assert!(matches!(result, Err(TaxError::InvalidArgument(msg)) if msg.contains("weekly")));
    }

    #[test]
    fn mode_scale() {
        assert_eq!(CalculationMode::Monthly.scale(), 1);
        assert_eq!(CalculationMode::Annual.scale(), 12);
    }

    #[test]
    fn period_orders_by_year_then_month() {
        assert!(PeriodKey::new(2023, 12) < PeriodKey::new(2024, 1));
        assert!(PeriodKey::new(2024, 1) < PeriodKey::new(2024, 2));
    }

    #[test]
    fn period_validate_checks_month_range() {
        assert_eq!(PeriodKey::new(2024, 1).validate(), Ok(()));
        assert_eq!(PeriodKey::new(2024, 12).validate(), Ok(()));
        assert!(PeriodKey::new(2024, 0).validate().is_err());
        assert!(PeriodKey::new(2024, 13).validate().is_err());
    }

    #[test]
    fn period_displays_as_year_month() {
        assert_eq!(PeriodKey::new(2024, 2).to_string(), "2024-02");
    }
}
