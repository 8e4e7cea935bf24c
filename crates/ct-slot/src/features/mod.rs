//! Bonus features layered over the base game
//!
//! ```text
//! SlotEngine
//!     │
//!     ├── BonusStateMachine (scatter → free spins, multiplier)
//!     └── JackpotTracker    (independent per-spin roll)
//! ```

mod free_spins;
mod jackpot;

pub use free_spins::*;
pub use jackpot::*;
