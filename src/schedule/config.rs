//! Configuration for schedule generation

use crate::error::{AmortError, Result};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Decimal places money fields are rounded to (cents)
pub const DEFAULT_CURRENCY_DECIMALS: u32 = 2;

/// Finest precision an `f64` money amount can still be rounded to
pub const MAX_CURRENCY_DECIMALS: u32 = 15;

/// What to do with extra payments on a bullet or interest-only loan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtraPaymentPolicy {
    /// Drop them without a trace
    Ignore,
    /// Drop them and log a warning
    #[default]
    Warn,
    /// Fail with `InvalidParameter` on `extra_payments`
    Reject,
}

/// Configuration for a schedule run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Decimal places for every emitted money field
    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: u32,

    /// Handling of extra payments on non-amortizing loans
    #[serde(default)]
    pub extra_payment_policy: ExtraPaymentPolicy,
}

fn default_currency_decimals() -> u32 {
    DEFAULT_CURRENCY_DECIMALS
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            currency_decimals: DEFAULT_CURRENCY_DECIMALS,
            extra_payment_policy: ExtraPaymentPolicy::default(),
        }
    }
}

impl ScheduleConfig {
    /// Load a config from a JSON file; missing keys take their defaults
    pub fn from_json_path(path: &Path) -> std::result::Result<Self, Box<dyn Error>> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.currency_decimals > MAX_CURRENCY_DECIMALS {
            return Err(AmortError::invalid(
                "currency_decimals",
                format!("must be at most {}, got {}", MAX_CURRENCY_DECIMALS, self.currency_decimals),
            ));
        }
        Ok(())
    }

    /// Round a money amount to the configured precision
    pub fn round_money(&self, value: f64) -> f64 {
        round_to(value, self.currency_decimals)
    }
}

/// Round half away from zero to `decimals` places (at most `MAX_CURRENCY_DECIMALS`)
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
