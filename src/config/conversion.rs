//! Medal-bonus conversion schedule.
//!
//! The base exchange rate is 2:1 - debit `amount`, credit `amount / 2`.
//! Medals improve the rate through a tier table keyed by medal count rather
//! than a hardcoded formula. The shipped thresholds:
//!
//! | medals held | bonus multiplier | credit for `amount` debited |
//! |-------------|------------------|-----------------------------|
//! | 0-2         | 1.0              | `amount / 2`                |
//! | 3-4         | 1.5              | `amount * 3 / 4`            |
//! | 5+          | 2.0              | `amount` (1:1)              |
//!
//! All credits round down. The table can be overridden with `[[tiers]]`
//! entries in config.toml; see [`load_config`].

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Minimum convertible amount; conversions also must be even.
pub const MIN_CONVERSION_AMOUNT: i64 = 2;

/// One tier of the medal bonus table: from `min_medals` medals upward, the
/// base credit (`amount / 2`) is multiplied by `numerator / denominator`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BonusTier {
    /// Medal count at which this tier starts applying
    pub min_medals: u64,
    /// Bonus multiplier numerator
    pub numerator: i64,
    /// Bonus multiplier denominator
    pub denominator: i64,
}

/// The full conversion schedule: an ascending list of bonus tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSchedule {
    tiers: Vec<BonusTier>,
}

impl Default for ConversionSchedule {
    fn default() -> Self {
        Self {
            tiers: vec![
                BonusTier { min_medals: 0, numerator: 1, denominator: 1 },
                BonusTier { min_medals: 3, numerator: 3, denominator: 2 },
                BonusTier { min_medals: 5, numerator: 2, denominator: 1 },
            ],
        }
    }
}

impl ConversionSchedule {
    /// Builds a schedule from tiers, validating that the table is non-empty,
    /// starts at zero medals, is sorted ascending, and has positive ratios.
    pub fn new(tiers: Vec<BonusTier>) -> Result<Self> {
        if tiers.first().is_none_or(|tier| tier.min_medals != 0) {
            return Err(Error::Config {
                message: "Conversion schedule must start with a min_medals = 0 tier".to_string(),
            });
        }

        for window in tiers.windows(2) {
            if window[1].min_medals <= window[0].min_medals {
                return Err(Error::Config {
                    message: "Conversion tiers must have strictly ascending min_medals".to_string(),
                });
            }
        }

        if tiers.iter().any(|tier| tier.numerator <= 0 || tier.denominator <= 0) {
            return Err(Error::Config {
                message: "Conversion tier ratios must be positive".to_string(),
            });
        }

        Ok(Self { tiers })
    }

    /// The credit for debiting `amount` of the source type while holding
    /// `medals` medals: `amount * numerator / (2 * denominator)`, floored.
    ///
    /// `amount` is assumed already validated as a positive even integer.
    #[must_use]
    pub fn credit_for(&self, amount: i64, medals: u64) -> i64 {
        let tier = self
            .tiers
            .iter()
            .rev()
            .find(|tier| medals >= tier.min_medals)
            .unwrap_or(&self.tiers[0]);

        amount * tier.numerator / (2 * tier.denominator)
    }
}

/// Raw config.toml structure for schedule overrides
#[derive(Debug, Deserialize)]
struct RawScheduleConfig {
    #[serde(default)]
    tiers: Vec<BonusTier>,
}

/// Loads the conversion schedule from a TOML file, falling back to the
/// default tier table when the file defines no `[[tiers]]`.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML is invalid, or the
/// tier table fails validation.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ConversionSchedule> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    let raw: RawScheduleConfig = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if raw.tiers.is_empty() {
        Ok(ConversionSchedule::default())
    } else {
        ConversionSchedule::new(raw.tiers)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_default_schedule_base_rate() {
        let schedule = ConversionSchedule::default();
        assert_eq!(schedule.credit_for(10, 0), 5);
        assert_eq!(schedule.credit_for(2, 2), 1);
    }

    #[test]
    fn test_default_schedule_medal_tiers() {
        let schedule = ConversionSchedule::default();
        // 3-4 medals: 1.5x bonus, floored
        assert_eq!(schedule.credit_for(10, 3), 7);
        assert_eq!(schedule.credit_for(8, 4), 6);
        // 5+ medals: 1:1
        assert_eq!(schedule.credit_for(10, 5), 10);
        assert_eq!(schedule.credit_for(10, 12), 10);
    }

    #[test]
    fn test_schedule_rejects_missing_base_tier() {
        let result = ConversionSchedule::new(vec![BonusTier {
            min_medals: 3,
            numerator: 3,
            denominator: 2,
        }]);
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));
    }

    #[test]
    fn test_schedule_rejects_unsorted_tiers() {
        let result = ConversionSchedule::new(vec![
            BonusTier { min_medals: 0, numerator: 1, denominator: 1 },
            BonusTier { min_medals: 5, numerator: 2, denominator: 1 },
            BonusTier { min_medals: 3, numerator: 3, denominator: 2 },
        ]);
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));
    }

    #[test]
    fn test_schedule_rejects_non_positive_ratio() {
        let result = ConversionSchedule::new(vec![BonusTier {
            min_medals: 0,
            numerator: 0,
            denominator: 1,
        }]);
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));
    }

    #[test]
    fn test_parse_tiers_from_toml() {
        let toml_str = r#"
            [[tiers]]
            min_medals = 0
            numerator = 1
            denominator = 1

            [[tiers]]
            min_medals = 2
            numerator = 2
            denominator = 1
        "#;

        let raw: RawScheduleConfig = toml::from_str(toml_str).unwrap();
        let schedule = ConversionSchedule::new(raw.tiers).unwrap();
        assert_eq!(schedule.credit_for(10, 1), 5);
        assert_eq!(schedule.credit_for(10, 2), 10);
    }
}
