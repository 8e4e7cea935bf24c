//! Spin controller: settles one spin against wallet, bonus and jackpot

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::SlotConfig;
use crate::error::{SlotError, SlotResult};
use crate::features::{BonusState, BonusStateMachine, BonusTransition, JackpotState, JackpotTracker};
use crate::paytable::PaylineEvaluator;
use crate::reels::{Grid, GridBuilder, SymbolGenerator};
use crate::spin::SpinOutcome;
use crate::wallet::{Bet, Credits, WalletState};

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub free_spins_played: u64,
    /// Stakes actually debited
    pub total_bet: Credits,
    /// Settled wins, jackpots excluded
    pub total_win: Credits,
    pub jackpot_total: Credits,
    pub wins: u64,
    pub losses: u64,
    pub bonus_triggers: u64,
    pub jackpots_won: u64,
    pub biggest_win: Credits,
}

impl SessionStats {
    /// Calculate RTP (jackpots included)
    pub fn rtp(&self) -> f64 {
        if self.total_bet.is_zero() {
            0.0
        } else {
            (self.total_win + self.jackpot_total).as_f64() / self.total_bet.as_f64() * 100.0
        }
    }

    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }

    fn record(&mut self, outcome: &SpinOutcome) {
        self.total_spins += 1;
        if outcome.is_free_spin {
            self.free_spins_played += 1;
        } else {
            self.total_bet += outcome.bet.credits();
        }

        if outcome.is_win() {
            self.wins += 1;
            self.total_win += outcome.win;
            self.biggest_win = self.biggest_win.max(outcome.win);
        } else {
            self.losses += 1;
        }

        if outcome.bonus_triggered {
            self.bonus_triggers += 1;
        }
        if let Some(jackpot) = outcome.jackpot {
            self.jackpots_won += 1;
            self.jackpot_total += jackpot.amount;
        }
    }
}

/// Owns the game state and settles spins strictly one at a time.
///
/// Every mutation of balance, bonus and jackpot goes through [`SlotEngine::spin`]
/// (or its forced variant) and [`SlotEngine::reset`].
pub struct SlotEngine {
    config: SlotConfig,
    grid_builder: GridBuilder,
    evaluator: PaylineEvaluator,
    bonus: BonusStateMachine,
    jackpot: JackpotTracker,
    wallet: WalletState,
    rng: ChaCha8Rng,
    spin_count: u64,
    stats: SessionStats,
    last_outcome: Option<SpinOutcome>,
}

impl SlotEngine {
    /// Create a new engine with default config
    pub fn new() -> Self {
        Self::with_config(SlotConfig::default())
    }

    /// Create with specific config
    pub fn with_config(config: SlotConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };

        Self {
            grid_builder: GridBuilder::new(SymbolGenerator::new(config.weight_policy)),
            evaluator: PaylineEvaluator::new(config.wild_policy),
            bonus: BonusStateMachine::new(config.bonus.clone()),
            jackpot: JackpotTracker::new(config.jackpot.clone()),
            wallet: WalletState::new(config.starting_credits(), config.default_bet),
            rng,
            spin_count: 0,
            stats: SessionStats::default(),
            last_outcome: None,
            config,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATE ACCESS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    pub fn wallet(&self) -> &WalletState {
        &self.wallet
    }

    pub fn bonus(&self) -> &BonusState {
        self.bonus.state()
    }

    pub fn jackpot(&self) -> &JackpotState {
        self.jackpot.state()
    }

    /// Get session stats
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn last_outcome(&self) -> Option<&SpinOutcome> {
        self.last_outcome.as_ref()
    }

    /// Reset session stats
    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
    }

    /// Seed RNG for reproducible results
    pub fn seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Select the stake for subsequent spins
    pub fn set_bet(&mut self, bet: Bet) {
        self.wallet.bet = bet;
    }

    /// Would a spin at `bet` be accepted right now?
    pub fn check_eligible(&self, bet: Bet) -> SlotResult<()> {
        if !self.wallet.can_cover(bet) && !self.bonus.state().has_free_spin() {
            return Err(SlotError::InsufficientFunds {
                balance: self.wallet.balance,
                bet: bet.credits(),
            });
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN EXECUTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Settle one random spin at `bet`
    pub fn spin(&mut self, bet: Bet) -> SlotResult<SpinOutcome> {
        self.settle(bet, None)
    }

    /// Settle a supplied grid through the same pipeline (replay and testing)
    pub fn spin_forced(&mut self, bet: Bet, grid: Grid) -> SlotResult<SpinOutcome> {
        self.settle(bet, Some(grid))
    }

    fn settle(&mut self, bet: Bet, forced: Option<Grid>) -> SlotResult<SpinOutcome> {
        // Nothing is mutated before this check
        if let Err(err) = self.check_eligible(bet) {
            log::warn!("Spin rejected: {}", err);
            return Err(err);
        }

        self.wallet.bet = bet;
        self.spin_count += 1;

        // 1. Stake: free spin or debit
        let is_free_spin = self.bonus.take_free_spin();
        if !is_free_spin {
            self.wallet.debit(bet)?;
        }

        // 2. Grid
        let grid = match forced {
            Some(grid) => grid,
            None => self.grid_builder.build(&mut self.rng),
        };

        // 3. Paylines and scatters
        let eval = self.evaluator.evaluate(&grid, bet);
        let mut outcome =
            SpinOutcome::new(self.spin_count, grid, bet, is_free_spin).with_evaluation(eval);

        // 4. Scatter bonus
        if let Some(transition) = self.bonus.on_scatter(outcome.scatter_count) {
            outcome.bonus_triggered = true;
            outcome.bonus_transition = Some(transition);
            outcome.scatter_win = bet.credits()
                * (outcome.scatter_count as u32 * self.config.bonus.scatter_pay_per_symbol);
        }

        // 5. Aggregate win
        outcome.multiplier = self.bonus.multiplier();
        outcome.base_win = outcome.line_total() + outcome.scatter_win;
        outcome.win = outcome.base_win * outcome.multiplier;

        // 6. Settle win
        self.wallet.credit(outcome.win);
        self.wallet.record_win(outcome.win);

        // 7. Jackpot roll, independent of the win
        if let Some(jackpot) = self.jackpot.maybe_trigger(&mut self.rng) {
            self.wallet.credit(jackpot.amount);
            outcome.jackpot = Some(jackpot);
        }

        // 8. Bonus exit check
        if let Some(BonusTransition::Exited) = self.bonus.on_spin_settled() {
            outcome.bonus_transition = Some(BonusTransition::Exited);
        }

        outcome.balance_after = self.wallet.balance;
        self.stats.record(&outcome);

        log::debug!(
            "Spin #{} bet={} free={} lines={:?} scatters={} win={} jackpot={} balance={}",
            outcome.spin_id,
            bet,
            is_free_spin,
            outcome.winning_lines(),
            outcome.scatter_count,
            outcome.win,
            outcome.jackpot_win(),
            outcome.balance_after
        );

        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Restore the wallet and clear the bonus; the jackpot pool is kept
    pub fn reset(&mut self) {
        self.wallet.reset(self.config.starting_credits());
        self.bonus.reset();
        log::info!("Session reset: balance {}", self.wallet.balance);
    }

    #[cfg(test)]
    pub(crate) fn bonus_machine_mut(&mut self) -> &mut BonusStateMachine {
        &mut self.bonus
    }

    #[cfg(test)]
    pub(crate) fn jackpot_tracker_mut(&mut self) -> &mut JackpotTracker {
        &mut self.jackpot
    }
}

impl Default for SlotEngine {
    fn default() -> Self {
        Self::new()
    }
}
