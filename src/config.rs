// 7.0 config.rs: all vault settings in one place. underlying, epoch windows, fee rates.
// 7.1 rates are human decimals here and become 18-decimal fixed point at the edge.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::clock::EpochLengths;
use crate::fees::FeeSchedule;
use crate::types::Ratio;

const HOUR: u64 = 3600;
const DAY: u64 = 24 * HOUR;

// Epoch windows in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochConfig {
    // Full cycle: staking + trading + settlement
    pub epoch_length_secs: u64,
    // Deposits and withdrawals window at the start of every epoch
    pub staking_length_secs: u64,
    // Strategy window right after staking
    pub trading_length_secs: u64,
}

impl Default for EpochConfig {
    fn default() -> Self {
        Self {
            epoch_length_secs: 7 * DAY,
            staking_length_secs: 4 * HOUR,
            trading_length_secs: 2 * DAY,
        }
    }
}

/** 7.2: fee rates as plain ratios. 0.1 = 10% */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    // Share of positive epoch result
    pub immediate_profit_fee: Decimal,
    // Yearly fee on principal, prorated per second
    pub annual_maintenance_fee: Decimal,
    // Expected epoch profit used by the rage-quit quote
    pub benchmark_profit: Decimal,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            immediate_profit_fee: dec!(0.1),
            annual_maintenance_fee: dec!(0.02),
            benchmark_profit: Decimal::ZERO,
        }
    }
}

// The complete vault configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    // Symbol or address of the asset the vault accounts in
    pub underlying: String,
    pub epoch: EpochConfig,
    pub fees: FeeConfig,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self::weekly()
    }
}

impl VaultConfig {
    // One-week epochs: 4h staking, 2d trading
    pub fn weekly() -> Self {
        Self {
            underlying: "WETH".to_string(),
            epoch: EpochConfig::default(),
            fees: FeeConfig::default(),
        }
    }

    // Short cycle used on test deployments: 3h staking, 2h trading, 100s settlement
    pub fn short_cycle() -> Self {
        let mut config = Self::weekly();
        config.epoch = EpochConfig {
            epoch_length_secs: 5 * HOUR + 100,
            staking_length_secs: 3 * HOUR,
            trading_length_secs: 2 * HOUR,
        };
        config
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    // Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.underlying.trim().is_empty() {
            return Err(ConfigError::InvalidUnderlying);
        }
        self.epoch_lengths()?;
        self.fee_schedule()?;
        Ok(())
    }

    pub fn epoch_lengths(&self) -> Result<EpochLengths, ConfigError> {
        EpochLengths::new(
            self.epoch.epoch_length_secs,
            self.epoch.staking_length_secs,
            self.epoch.trading_length_secs,
        )
    }

    // No upper cap on rates: only non-negative and representable.
    pub fn fee_schedule(&self) -> Result<FeeSchedule, ConfigError> {
        Ok(FeeSchedule {
            immediate_profit_fee: parse_rate("immediate_profit_fee", self.fees.immediate_profit_fee)?,
            annual_maintenance_fee: parse_rate("annual_maintenance_fee", self.fees.annual_maintenance_fee)?,
            benchmark_profit: parse_rate("benchmark_profit", self.fees.benchmark_profit)?,
        })
    }
}

fn parse_rate(field: &'static str, value: Decimal) -> Result<Ratio, ConfigError> {
    Ratio::from_decimal(value).ok_or(ConfigError::InvalidFeeRate { field, value })
}

// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid epoch lengths: {reason}")]
    InvalidEpochLengths { reason: String },

    #[error("Invalid fee rate for {field}: {value}")]
    InvalidFeeRate { field: &'static str, value: Decimal },

    #[error("Underlying asset must be named")]
    InvalidUnderlying,

    #[error("Config parse error: {reason}")]
    Parse { reason: String },
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn config(&self) -> VaultConfig {
        match self {
            Environment::Development => VaultConfig::short_cycle(),
            Environment::Production => VaultConfig::weekly(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = VaultConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.epoch.epoch_length_secs, 604_800);
    }

    #[test]
    fn test_short_cycle_valid() {
        let config = VaultConfig::short_cycle();
        assert!(config.validate().is_ok());
        let lengths = config.epoch_lengths().unwrap();
        assert_eq!(lengths.epoch, 18_100);
    }

    #[test]
    fn test_environment_presets() {
        assert!(Environment::Development.config().validate().is_ok());
        assert!(Environment::Production.config().validate().is_ok());
    }

    #[test]
    fn test_default_fee_schedule() {
        let schedule = VaultConfig::default().fee_schedule().unwrap();
        assert_eq!(schedule, FeeSchedule::default());
    }

    #[test]
    fn test_overlapping_windows_rejected() {
        let mut config = VaultConfig::default();
        config.epoch.trading_length_secs = config.epoch.epoch_length_secs;

        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::InvalidEpochLengths { .. })));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut config = VaultConfig::default();
        config.fees.annual_maintenance_fee = dec!(-0.01);

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidFeeRate { field: "annual_maintenance_fee", .. })
        ));
    }

    #[test]
    fn test_rate_above_one_accepted() {
        let mut config = VaultConfig::default();
        config.fees.immediate_profit_fee = dec!(1.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let raw = r#"{
            "underlying": "USDC",
            "epoch": {
                "epoch_length_secs": 86400,
                "staking_length_secs": 3600,
                "trading_length_secs": 7200
            },
            "fees": {
                "immediate_profit_fee": "0.2",
                "annual_maintenance_fee": "0.01",
                "benchmark_profit": "0.05"
            }
        }"#;
        let config = VaultConfig::from_json(raw).unwrap();
        assert_eq!(config.underlying, "USDC");
        assert_eq!(config.fees.immediate_profit_fee, dec!(0.2));
        assert_eq!(config.epoch_lengths().unwrap().trading, 7_200);
    }

    #[test]
    fn test_config_from_bad_json() {
        assert!(matches!(
            VaultConfig::from_json("{ not json"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = VaultConfig::short_cycle();
        let json = serde_json::to_string(&config).unwrap();
        let back = VaultConfig::from_json(&json).unwrap();
        assert_eq!(back.epoch.epoch_length_secs, config.epoch.epoch_length_secs);
    }
}
