//! Error types for the slot engine

use thiserror::Error;

use crate::wallet::Credits;

/// Rejections surfaced to the presentation layer.
///
/// None of these are fatal: a rejected request leaves wallet, bonus and
/// jackpot state exactly as they were.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Insufficient funds: balance {balance} is below bet {bet}")]
    InsufficientFunds { balance: Credits, bet: Credits },

    #[error("Invalid bet amount: {0}")]
    InvalidBetAmount(u32),

    #[error("Spin rejected: another spin is still settling")]
    ConcurrentSpinRejected,

    #[error("Request rejected while auto spin is running")]
    AutoSpinActive,
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
