use serde::{Deserialize, Serialize};

/// How the engine chooses between the per-dependent deduction and the flat
/// simplified deduction.
///
/// The two variants disagree whenever there are dependents but their total
/// deduction is below the simplified amount: `Threshold` then takes the
/// larger simplified amount while `Presence` still takes the dependents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionPolicy {
    /// Per-dependent deduction only if it strictly exceeds the simplified
    /// amount.
    #[default]
    Threshold,
    /// Per-dependent deduction whenever there is at least one dependent.
    Presence,
}

/// Decimal places kept in the effective rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePrecision {
    /// Four decimal places.
    #[default]
    Standard,
    /// Two decimal places.
    Legacy,
}

impl RatePrecision {
    pub fn decimal_places(&self) -> u32 {
        match self {
            Self::Standard => 4,
            Self::Legacy => 2,
        }
    }
}

/// Engine settings. Fixed for the lifetime of a [`crate::TaxEngine`] so that
/// every result it produces follows the same policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub deduction_policy: DeductionPolicy,
    pub rate_precision: RatePrecision,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_uses_threshold_and_four_places() {
        let config = EngineConfig::default();

        assert_eq!(config.deduction_policy, DeductionPolicy::Threshold);
        assert_eq!(config.rate_precision.decimal_places(), 4);
    }

    #[test]
    fn legacy_precision_keeps_two_places() {
        assert_eq!(RatePrecision::Legacy.decimal_places(), 2);
    }
}
