//! Settled spin outcome handed to the presentation layer

use serde::{Deserialize, Serialize};

use crate::features::{BonusTransition, JackpotWin};
use crate::paytable::{EvaluationResult, LineWin};
use crate::reels::Grid;
use crate::wallet::{Bet, Credits};

/// Complete result of one settled spin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// Sequence number within the session (1-based)
    pub spin_id: u64,
    /// Realised grid
    pub grid: Grid,
    /// Stake the spin was evaluated at
    pub bet: Bet,
    /// Was the stake covered by a free spin?
    pub is_free_spin: bool,
    /// Paying lines
    pub line_wins: Vec<LineWin>,
    /// Scatter symbols anywhere on the grid
    pub scatter_count: u8,
    /// Scatter pay before the multiplier
    pub scatter_win: Credits,
    /// Did the scatters trigger the bonus?
    pub bonus_triggered: bool,
    /// Multiplier applied to the aggregate win
    pub multiplier: u32,
    /// Line pays + scatter pay, before the multiplier
    pub base_win: Credits,
    /// Settled win (base win × multiplier), jackpot excluded
    pub win: Credits,
    /// Jackpot paid on this spin, if it hit
    pub jackpot: Option<JackpotWin>,
    /// Bonus state change caused by this spin
    pub bonus_transition: Option<BonusTransition>,
    /// Balance after settlement
    pub balance_after: Credits,
}

impl SpinOutcome {
    pub(crate) fn new(spin_id: u64, grid: Grid, bet: Bet, is_free_spin: bool) -> Self {
        Self {
            spin_id,
            grid,
            bet,
            is_free_spin,
            line_wins: Vec::new(),
            scatter_count: 0,
            scatter_win: Credits::ZERO,
            bonus_triggered: false,
            multiplier: 1,
            base_win: Credits::ZERO,
            win: Credits::ZERO,
            jackpot: None,
            bonus_transition: None,
            balance_after: Credits::ZERO,
        }
    }

    /// Apply evaluation result
    pub(crate) fn with_evaluation(mut self, eval: EvaluationResult) -> Self {
        self.line_wins = eval.line_wins;
        self.scatter_count = eval.scatter_count;
        self
    }

    /// Indices of paying lines
    pub fn winning_lines(&self) -> Vec<u8> {
        self.line_wins.iter().map(|w| w.line_index).collect()
    }

    /// Sum of line pays before the multiplier
    pub fn line_total(&self) -> Credits {
        self.line_wins.iter().map(|w| w.win_amount).sum()
    }

    /// Jackpot amount, zero when it did not hit
    pub fn jackpot_win(&self) -> Credits {
        self.jackpot.map(|j| j.amount).unwrap_or_default()
    }

    /// Everything credited to the balance by this spin
    pub fn total_credited(&self) -> Credits {
        self.win + self.jackpot_win()
    }

    /// Check if this is a win
    pub fn is_win(&self) -> bool {
        !self.win.is_zero()
    }
}
