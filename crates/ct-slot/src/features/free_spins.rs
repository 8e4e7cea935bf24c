//! Free Spins bonus state machine
//!
//! Scatter-triggered bonus with:
//! - Additive free-spin awards (a retrigger stacks another award)
//! - A win multiplier that survives entry and resets on exit
//! - Exit checked once per settled spin, never mid-spin

use serde::{Deserialize, Serialize};

/// Scatters needed to trigger the bonus
pub const DEFAULT_SCATTER_TRIGGER: u8 = 3;

/// Free spins added per trigger
pub const DEFAULT_FREE_SPINS_AWARD: u32 = 10;

/// Bonus configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusConfig {
    /// Scatters anywhere on the grid needed to trigger
    pub scatter_trigger: u8,
    /// Free spins added per trigger
    pub free_spins_award: u32,
    /// Scatter pay in bets per scatter symbol (`bet * count * this`)
    pub scatter_pay_per_symbol: u32,
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self {
            scatter_trigger: DEFAULT_SCATTER_TRIGGER,
            free_spins_award: DEFAULT_FREE_SPINS_AWARD,
            scatter_pay_per_symbol: 5,
        }
    }
}

/// Coarse bonus phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusPhase {
    Idle,
    BonusActive,
}

/// Bonus runtime state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusState {
    pub active: bool,
    pub free_spins_remaining: u32,
    pub multiplier: u32,
}

impl BonusState {
    pub fn phase(&self) -> BonusPhase {
        if self.active {
            BonusPhase::BonusActive
        } else {
            BonusPhase::Idle
        }
    }

    pub fn has_free_spin(&self) -> bool {
        self.free_spins_remaining > 0
    }
}

impl Default for BonusState {
    fn default() -> Self {
        Self {
            active: false,
            free_spins_remaining: 0,
            multiplier: 1,
        }
    }
}

/// Transition reported by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusTransition {
    /// Idle -> BonusActive
    Entered { free_spins: u32 },
    /// BonusActive -> BonusActive with more spins
    Retriggered { free_spins: u32 },
    /// BonusActive -> Idle
    Exited,
}

/// Tracks free spins, the bonus flag and the win multiplier
#[derive(Debug, Clone, Default)]
pub struct BonusStateMachine {
    config: BonusConfig,
    state: BonusState,
}

impl BonusStateMachine {
    pub fn new(config: BonusConfig) -> Self {
        Self {
            config,
            state: BonusState::default(),
        }
    }

    pub fn config(&self) -> &BonusConfig {
        &self.config
    }

    pub fn state(&self) -> &BonusState {
        &self.state
    }

    pub fn multiplier(&self) -> u32 {
        self.state.multiplier
    }

    /// Does `scatter_count` trigger the bonus?
    pub fn triggers(&self, scatter_count: u8) -> bool {
        scatter_count >= self.config.scatter_trigger
    }

    /// Consume one free spin if any remain
    pub fn take_free_spin(&mut self) -> bool {
        if self.state.free_spins_remaining > 0 {
            self.state.free_spins_remaining -= 1;
            true
        } else {
            false
        }
    }

    /// Apply a scatter trigger.
    ///
    /// The award is added to whatever remains; the multiplier is untouched.
    pub fn on_scatter(&mut self, scatter_count: u8) -> Option<BonusTransition> {
        if !self.triggers(scatter_count) {
            return None;
        }

        let award = self.config.free_spins_award;
        self.state.free_spins_remaining += award;

        if self.state.active {
            log::info!(
                "Free spins retriggered: +{} ({} remaining)",
                award,
                self.state.free_spins_remaining
            );
            Some(BonusTransition::Retriggered { free_spins: award })
        } else {
            self.state.active = true;
            log::info!("Bonus entered with {} free spins", self.state.free_spins_remaining);
            Some(BonusTransition::Entered { free_spins: award })
        }
    }

    /// Exit check, run once after a spin settles
    pub fn on_spin_settled(&mut self) -> Option<BonusTransition> {
        if self.state.active && self.state.free_spins_remaining == 0 {
            self.state.active = false;
            self.state.multiplier = 1;
            log::info!("Bonus exhausted, back to base game");
            Some(BonusTransition::Exited)
        } else {
            None
        }
    }

    /// Back to Idle with no free spins and multiplier 1
    pub fn reset(&mut self) {
        self.state = BonusState::default();
    }

    #[cfg(test)]
    pub(crate) fn set_multiplier(&mut self, multiplier: u32) {
        self.state.multiplier = multiplier.max(1);
    }
}
