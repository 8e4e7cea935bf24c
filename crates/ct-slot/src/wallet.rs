//! Player balance, stake menu and fixed-point credit amounts

use std::fmt;
use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

/// Stakes offered by the bet selector
pub const ALLOWED_BETS: [u32; 6] = [1, 5, 10, 25, 50, 100];

/// Balance restored by a reset
pub const DEFAULT_BALANCE: u64 = 1000;

/// Stake selected when a session starts
pub const DEFAULT_BET: u32 = 10;

/// Credit amount in hundredths (1000.00 is stored as 100_000).
///
/// Line pays are `value * bet * count / 100` whole credits, which is always a
/// whole number of hundredths, so every payout is exact.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Credits(u64);

impl Credits {
    pub const ZERO: Self = Self(0);

    /// Amount from whole credits
    pub const fn from_whole(whole: u64) -> Self {
        Self(whole * 100)
    }

    /// Amount from hundredths of a credit
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Raw hundredths
    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Lossy conversion for ratios and reports
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Credits {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Credits {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.saturating_add(rhs);
    }
}

impl Mul<u32> for Credits {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0.saturating_mul(rhs as u64))
    }
}

impl std::iter::Sum for Credits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, c| acc + c)
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A stake from the fixed menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Bet(u32);

impl Bet {
    /// Validate a stake against the menu
    pub fn new(amount: u32) -> SlotResult<Self> {
        if ALLOWED_BETS.contains(&amount) {
            Ok(Self(amount))
        } else {
            Err(SlotError::InvalidBetAmount(amount))
        }
    }

    /// All stakes on the menu, smallest first
    pub fn menu() -> impl Iterator<Item = Bet> {
        ALLOWED_BETS.iter().map(|&amount| Bet(amount))
    }

    pub fn amount(self) -> u32 {
        self.0
    }

    pub fn credits(self) -> Credits {
        Credits::from_whole(self.0 as u64)
    }
}

impl Default for Bet {
    fn default() -> Self {
        Self(DEFAULT_BET)
    }
}

impl TryFrom<u32> for Bet {
    type Error = SlotError;

    fn try_from(amount: u32) -> SlotResult<Self> {
        Self::new(amount)
    }
}

impl From<Bet> for u32 {
    fn from(bet: Bet) -> u32 {
        bet.0
    }
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player wallet.
///
/// Only the spin controller and the reset path mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletState {
    pub balance: Credits,
    pub bet: Bet,
    /// Settled win of the latest spin (jackpot excluded)
    pub last_win: Credits,
    /// Sum of settled wins since the last reset (jackpots excluded)
    pub total_wins: Credits,
}

impl WalletState {
    pub fn new(balance: Credits, bet: Bet) -> Self {
        Self {
            balance,
            bet,
            last_win: Credits::ZERO,
            total_wins: Credits::ZERO,
        }
    }

    /// Can the current bet be paid from the balance?
    pub fn can_cover(&self, bet: Bet) -> bool {
        self.balance >= bet.credits()
    }

    pub(crate) fn debit(&mut self, bet: Bet) -> SlotResult<()> {
        self.balance = self
            .balance
            .checked_sub(bet.credits())
            .ok_or(SlotError::InsufficientFunds {
                balance: self.balance,
                bet: bet.credits(),
            })?;
        Ok(())
    }

    pub(crate) fn credit(&mut self, amount: Credits) {
        self.balance += amount;
    }

    pub(crate) fn record_win(&mut self, win: Credits) {
        self.last_win = win;
        self.total_wins += win;
    }

    /// Restore balance and counters; the selected stake is kept
    pub(crate) fn reset(&mut self, balance: Credits) {
        self.balance = balance;
        self.last_win = Credits::ZERO;
        self.total_wins = Credits::ZERO;
    }
}

impl Default for WalletState {
    fn default() -> Self {
        Self::new(Credits::from_whole(DEFAULT_BALANCE), Bet::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bet_menu() {
        for amount in ALLOWED_BETS {
            assert_eq!(Bet::new(amount).unwrap().amount(), amount);
        }
        assert_eq!(Bet::new(0), Err(SlotError::InvalidBetAmount(0)));
        assert_eq!(Bet::new(20), Err(SlotError::InvalidBetAmount(20)));
        assert_eq!(Bet::menu().count(), 6);
    }

    #[test]
    fn test_credits_display() {
        assert_eq!(Credits::from_whole(1000).to_string(), "1000.00");
        assert_eq!(Credits::from_cents(90).to_string(), "0.90");
        assert_eq!(Credits::from_cents(12_345).to_string(), "123.45");
    }

    #[test]
    fn test_debit_exact_balance() {
        let bet = Bet::new(10).unwrap();
        let mut wallet = WalletState::new(Credits::from_whole(10), bet);
        wallet.debit(bet).unwrap();
        assert_eq!(wallet.balance, Credits::ZERO);
    }

    #[test]
    fn test_debit_insufficient_leaves_balance() {
        let bet = Bet::new(25).unwrap();
        let mut wallet = WalletState::new(Credits::from_whole(10), bet);
        let err = wallet.debit(bet).unwrap_err();
        assert!(matches!(err, SlotError::InsufficientFunds { .. }));
        assert_eq!(wallet.balance, Credits::from_whole(10));
    }

    #[test]
    fn test_bet_deserialize_rejects_off_menu() {
        let ok: Bet = serde_json::from_str("25").unwrap();
        assert_eq!(ok.amount(), 25);
        assert!(serde_json::from_str::<Bet>("7").is_err());
    }
}
