//! Slot engine configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::features::{BonusConfig, JackpotConfig};
use crate::paytable::WildPolicy;
use crate::reels::{REELS, ROWS, WeightPolicy};
use crate::wallet::{Bet, Credits, DEFAULT_BALANCE};

/// Engine configuration.
///
/// The symbol table and paylines are fixed; this only tunes balances,
/// bonus/jackpot constants, the two generation/evaluation policies and the
/// RNG seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Balance at start and after reset (whole credits)
    pub starting_balance: u64,
    /// Stake selected at start
    pub default_bet: Bet,
    pub bonus: BonusConfig,
    pub jackpot: JackpotConfig,
    pub weight_policy: WeightPolicy,
    pub wild_policy: WildPolicy,
    /// Fixed seed for reproducible sessions (None = OS entropy)
    pub rng_seed: Option<u64>,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_BALANCE,
            default_bet: Bet::default(),
            bonus: BonusConfig::default(),
            jackpot: JackpotConfig::default(),
            weight_policy: WeightPolicy::default(),
            wild_policy: WildPolicy::default(),
            rng_seed: None,
        }
    }
}

impl SlotConfig {
    /// Reproducible config with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng_seed: Some(seed),
            ..Default::default()
        }
    }

    /// Wild and Scatter reachable, Wild substituting as the paytable says
    pub fn rebalanced() -> Self {
        Self {
            weight_policy: WeightPolicy::Rebalanced,
            wild_policy: WildPolicy::Substitute,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn starting_credits(&self) -> Credits {
        Credits::from_whole(self.starting_balance)
    }

    /// Parse JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML config
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text)?,
            Some("yaml" | "yml") => Self::from_yaml(&text)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ));
            }
        };
        log::info!("Loaded slot config from {:?}", path);
        Ok(config)
    }

    /// Check ranges the type system cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.jackpot.trigger_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidValue(format!(
                "jackpot.trigger_probability must be within [0, 1], got {p}"
            )));
        }
        let cells = (REELS * ROWS) as u8;
        if !(1..=cells).contains(&self.bonus.scatter_trigger) {
            return Err(ConfigError::InvalidValue(format!(
                "bonus.scatter_trigger must be within 1..={cells}, got {}",
                self.bonus.scatter_trigger
            )));
        }
        if self.bonus.free_spins_award == 0 {
            return Err(ConfigError::InvalidValue(
                "bonus.free_spins_award must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Unsupported config format: {0:?}")]
    UnsupportedFormat(String),

    #[error("Invalid parameter value: {0}")]
    InvalidValue(String),
}
