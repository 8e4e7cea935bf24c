//! Jackpot pool and per-spin trigger roll

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::wallet::Credits;

/// Pool value after a payout
pub const DEFAULT_JACKPOT_SEED: u64 = 50_000;

/// Chance of a jackpot on any settled spin
pub const DEFAULT_JACKPOT_PROBABILITY: f64 = 0.001;

/// Jackpot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JackpotConfig {
    /// Seed value in whole credits
    pub seed: u64,
    pub trigger_probability: f64,
}

impl Default for JackpotConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_JACKPOT_SEED,
            trigger_probability: DEFAULT_JACKPOT_PROBABILITY,
        }
    }
}

impl JackpotConfig {
    pub fn seed_credits(&self) -> Credits {
        Credits::from_whole(self.seed)
    }
}

/// Jackpot pool.
///
/// Static between payouts: bets do not feed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JackpotState {
    pub pool: Credits,
}

impl Default for JackpotState {
    fn default() -> Self {
        Self {
            pool: Credits::from_whole(DEFAULT_JACKPOT_SEED),
        }
    }
}

/// Jackpot hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JackpotWin {
    pub amount: Credits,
}

/// Holds the pool and rolls the independent trigger
#[derive(Debug, Clone, Default)]
pub struct JackpotTracker {
    config: JackpotConfig,
    state: JackpotState,
}

impl JackpotTracker {
    pub fn new(config: JackpotConfig) -> Self {
        let state = JackpotState {
            pool: config.seed_credits(),
        };
        Self { config, state }
    }

    pub fn config(&self) -> &JackpotConfig {
        &self.config
    }

    pub fn state(&self) -> &JackpotState {
        &self.state
    }

    pub fn pool(&self) -> Credits {
        self.state.pool
    }

    /// One Bernoulli trial; on a hit the whole pool is paid and re-seeded
    pub fn maybe_trigger<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<JackpotWin> {
        let roll: f64 = rng.random();
        self.settle_roll(roll)
    }

    /// Resolve a roll in [0, 1)
    pub fn settle_roll(&mut self, roll: f64) -> Option<JackpotWin> {
        if roll < self.config.trigger_probability {
            let amount = self.state.pool;
            self.state.pool = self.config.seed_credits();
            log::info!("Jackpot hit: {} paid, pool reset to {}", amount, self.state.pool);
            Some(JackpotWin { amount })
        } else {
            None
        }
    }

    #[cfg(test)]
    pub(crate) fn set_pool(&mut self, pool: Credits) {
        self.state.pool = pool;
    }
}
